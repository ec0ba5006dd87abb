//! Spanning tree extraction.

use crate::error::{KirchhoffError, Result};
use crate::graph::{ArcId, Multigraph, Strategy, VertexId, VisitMap};

/// A split of the arc set into spanning-tree arcs and co-tree links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePartition {
    root: VertexId,
    tree: Vec<ArcId>,
    links: Vec<ArcId>,
    vertex_count: usize,
}

impl TreePartition {
    /// Vertex the tree was grown from.
    pub fn root(&self) -> VertexId {
        self.root
    }

    /// Tree arcs in discovery order.
    pub fn tree(&self) -> &[ArcId] {
        &self.tree
    }

    /// Co-tree arcs in arena order.
    pub fn links(&self) -> &[ArcId] {
        &self.links
    }

    pub fn is_tree_arc(&self, arc: ArcId) -> bool {
        self.tree.contains(&arc)
    }

    /// True when the tree reaches every vertex of the graph it was built on,
    /// i.e. the graph is connected.
    pub fn is_spanning(&self) -> bool {
        self.tree.len() + 1 == self.vertex_count
    }
}

/// Grow a spanning tree from the first vertex in arena order.
///
/// Iterative depth-first search over the undirected view of the graph. When a
/// vertex is reached for the first time the arc it was reached through becomes
/// a tree arc. Neighbors are scanned in adjacency-list order, so among
/// parallel arcs the most recently inserted one is taken.
///
/// On a disconnected graph only the root's component is covered; check
/// [`TreePartition::is_spanning`] before relying on the result.
pub fn spanning_tree<V, A>(graph: &Multigraph<V, A>) -> Result<TreePartition> {
    let root = graph
        .vertex_ids()
        .next()
        .ok_or_else(|| KirchhoffError::insufficient("graph has no vertices"))?;

    let mut visited = VisitMap::new(graph);
    let mut in_tree = vec![false; graph.arc_capacity()];
    let mut tree = Vec::with_capacity(graph.vertex_count().saturating_sub(1));
    let mut stack = vec![root];
    visited.visit(graph.vertex(root)?.slot());

    while let Some(vertex) = stack.pop() {
        for step in graph.adjacent(vertex, Strategy::Edge)? {
            let next = graph.vertex(step.vertex())?.slot();
            if !visited.is_visited(next) {
                visited.visit(next);
                in_tree[graph.arc_slot(step.arc())?] = true;
                tree.push(step.arc());
                stack.push(step.vertex());
            }
        }
    }

    let mut links = Vec::with_capacity(graph.arc_count().saturating_sub(tree.len()));
    for arc in graph.arcs() {
        if !in_tree[graph.arc_slot(arc.id())?] {
            links.push(arc.id());
        }
    }

    tracing::trace!(
        root = %root,
        tree = tree.len(),
        links = links.len(),
        "spanning tree"
    );

    Ok(TreePartition {
        root,
        tree,
        links,
        vertex_count: graph.vertex_count(),
    })
}
