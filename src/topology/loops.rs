//! Fundamental loop extraction.

use std::collections::VecDeque;
use std::fmt;

use super::tree::TreePartition;
use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph, VertexId};

/// One fundamental cycle: a co-tree link closed by the tree path from the
/// link's head back to its tail.
///
/// The loop is oriented along its link, so the link always counts +1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLoop {
    index: usize,
    vertices: Vec<VertexId>,
    arcs: Vec<ArcId>,
    aligned: Vec<bool>,
    link: ArcId,
}

impl BasicLoop {
    /// Position of this loop in the basis (its row in the loop matrix).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tree path from the link head to the link tail.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Tree arcs along the path; `arcs()[i]` joins `vertices()[i]` and `vertices()[i + 1]`.
    pub fn arcs(&self) -> &[ArcId] {
        &self.arcs
    }

    /// Whether each path arc points the same way the path walks it.
    pub fn orientation(&self) -> &[bool] {
        &self.aligned
    }

    /// The co-tree arc that generated this loop.
    pub fn link(&self) -> ArcId {
        self.link
    }

    /// Incidence of `arc` on this loop: +1 if it is the link or a path arc
    /// pointing along the loop, -1 for a path arc pointing against it, 0 if
    /// the arc is not part of the loop.
    pub fn related_value(&self, arc: ArcId) -> i8 {
        if arc == self.link {
            return 1;
        }
        match self.arcs.iter().position(|&a| a == arc) {
            Some(i) if self.aligned[i] => 1,
            Some(_) => -1,
            None => 0,
        }
    }
}

impl fmt::Display for BasicLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} link {}:", self.index, self.link)?;
        for (arc, aligned) in self.arcs.iter().zip(&self.aligned) {
            write!(f, " {}{}", if *aligned { '+' } else { '-' }, arc)?;
        }
        Ok(())
    }
}

/// Build one fundamental loop per co-tree link.
///
/// Tree paths come from parent pointers laid down by a breadth-first search
/// over the tree arcs only, starting at the partition root. The graph is only
/// read, never modified. Loops are numbered in link order.
pub fn fundamental_loops<V, A>(
    graph: &Multigraph<V, A>,
    partition: &TreePartition,
) -> Result<Vec<BasicLoop>> {
    if !partition.is_spanning() {
        return Err(KirchhoffError::singular(
            "graph is not connected; solve each connected component on its own",
        ));
    }

    let capacity = graph.vertex_capacity();
    let mut ids = vec![None; capacity];
    for vertex in graph.vertices() {
        ids[vertex.slot()] = Some(vertex.id());
    }

    // Tree-only adjacency: (neighbor slot, arc)
    let mut tree_adjacency: Vec<Vec<(usize, ArcId)>> = vec![Vec::new(); capacity];
    for &arc_id in partition.tree() {
        let arc = graph.arc(arc_id)?;
        let tail = graph.vertex(arc.tail())?.slot();
        let head = graph.vertex(arc.head())?.slot();
        tree_adjacency[tail].push((head, arc_id));
        tree_adjacency[head].push((tail, arc_id));
    }

    let root = graph.vertex(partition.root())?.slot();
    let mut parent: Vec<Option<(usize, ArcId)>> = vec![None; capacity];
    let mut depth = vec![0usize; capacity];
    let mut reached = vec![false; capacity];
    reached[root] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(slot) = queue.pop_front() {
        for &(next, arc) in &tree_adjacency[slot] {
            if !reached[next] {
                reached[next] = true;
                parent[next] = Some((slot, arc));
                depth[next] = depth[slot] + 1;
                queue.push_back(next);
            }
        }
    }

    let climb = |slot: usize| -> Result<(usize, ArcId)> {
        parent[slot].ok_or_else(|| KirchhoffError::singular("tree path leaves the spanning tree"))
    };
    let id_of = |slot: usize| -> Result<VertexId> {
        ids[slot].ok_or_else(|| KirchhoffError::singular("tree path reaches a removed vertex"))
    };

    let mut loops = Vec::with_capacity(partition.links().len());
    for (index, &link) in partition.links().iter().enumerate() {
        let arc = graph.arc(link)?;
        let mut a = graph.vertex(arc.head())?.slot();
        let mut b = graph.vertex(arc.tail())?.slot();

        // Walk both ends up to their lowest common ancestor.
        let mut from_head = vec![a];
        let mut from_tail = vec![b];
        let mut head_arcs = Vec::new();
        let mut tail_arcs = Vec::new();
        while depth[a] > depth[b] {
            let (up, via) = climb(a)?;
            head_arcs.push(via);
            from_head.push(up);
            a = up;
        }
        while depth[b] > depth[a] {
            let (up, via) = climb(b)?;
            tail_arcs.push(via);
            from_tail.push(up);
            b = up;
        }
        while a != b {
            let (up_a, via_a) = climb(a)?;
            let (up_b, via_b) = climb(b)?;
            head_arcs.push(via_a);
            tail_arcs.push(via_b);
            from_head.push(up_a);
            from_tail.push(up_b);
            a = up_a;
            b = up_b;
        }

        // from_tail ends at the common ancestor already in from_head.
        from_tail.pop();
        let slots: Vec<usize> = from_head.into_iter().chain(from_tail.into_iter().rev()).collect();
        let arcs: Vec<ArcId> = head_arcs.into_iter().chain(tail_arcs.into_iter().rev()).collect();

        let vertices = slots.iter().map(|&s| id_of(s)).collect::<Result<Vec<_>>>()?;
        let aligned = arcs
            .iter()
            .zip(&vertices)
            .map(|(&a, &from)| -> Result<bool> { Ok(graph.arc(a)?.tail() == from) })
            .collect::<Result<Vec<_>>>()?;

        let basic = BasicLoop {
            index,
            vertices,
            arcs,
            aligned,
            link,
        };
        tracing::trace!(%basic, "fundamental loop");
        loops.push(basic);
    }

    Ok(loops)
}
