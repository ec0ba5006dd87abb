//! Adjacency cursors and graph searches.
//!
//! All searches are parameterized by a [`Strategy`] and a per-vertex visitor
//! callback; none of them know what the payloads mean. Visited state is kept
//! in a [`VisitMap`] indexed by vertex arena slot.

use std::collections::VecDeque;

use super::multigraph::Multigraph;
use super::types::{ArcId, Search, Strategy, VertexId};
use crate::error::Result;

/// One step of an adjacency cursor: the arc taken and the vertex it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    vertex: VertexId,
    arc: ArcId,
    arc_slot: usize,
    outgoing: bool,
}

impl Step {
    /// The neighbor reached through this step.
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn arc(&self) -> ArcId {
        self.arc
    }

    /// Whether the arc was taken from its tail (along its direction).
    pub fn is_outgoing(&self) -> bool {
        self.outgoing
    }
}

/// Visited flags indexed by vertex arena slot.
#[derive(Debug, Clone)]
pub struct VisitMap {
    flags: Vec<bool>,
}

impl VisitMap {
    pub fn new<V, A>(graph: &Multigraph<V, A>) -> Self {
        Self {
            flags: vec![false; graph.vertex_capacity()],
        }
    }

    pub fn is_visited(&self, slot: usize) -> bool {
        self.flags.get(slot).copied().unwrap_or(false)
    }

    pub fn visit(&mut self, slot: usize) {
        if slot >= self.flags.len() {
            self.flags.resize(slot + 1, false);
        }
        self.flags[slot] = true;
    }
}

impl<V, A> Multigraph<V, A> {
    // ============ Cursors ============

    /// First neighbor of `vertex` under `strategy`.
    pub fn first_adjacent(&self, vertex: VertexId, strategy: Strategy) -> Result<Option<Step>> {
        let slot = self.vertex_slot(vertex)?;
        let record = self.vertex_at(slot);
        let step = match strategy {
            Strategy::Out => self.out_step(record.first_out),
            Strategy::In => self.in_step(record.first_in),
            Strategy::Edge => self
                .out_step(record.first_out)
                .or_else(|| self.in_step(record.first_in)),
        };
        Ok(step)
    }

    /// Neighbor of `vertex` following the one reached by `prev`.
    pub fn next_adjacent(
        &self,
        vertex: VertexId,
        strategy: Strategy,
        prev: &Step,
    ) -> Result<Option<Step>> {
        let slot = self.vertex_slot(vertex)?;
        Ok(self.step_after(self.vertex_at(slot).first_in, strategy, prev))
    }

    /// Cursor advance once the vertex is known to exist; `first_in` is the
    /// head of that vertex's incoming list.
    fn step_after(&self, first_in: Option<usize>, strategy: Strategy, prev: &Step) -> Option<Step> {
        let arc = self.arc_at(prev.arc_slot);
        match (strategy, prev.outgoing) {
            (Strategy::Out, _) => self.out_step(arc.next_out),
            (Strategy::In, _) => self.in_step(arc.next_in),
            (Strategy::Edge, true) => self
                .out_step(arc.next_out)
                .or_else(|| self.in_step(first_in)),
            (Strategy::Edge, false) => self.in_step(arc.next_in),
        }
    }

    /// Iterate over every neighbor step of `vertex` under `strategy`.
    pub fn adjacent(&self, vertex: VertexId, strategy: Strategy) -> Result<Adjacent<'_, V, A>> {
        let slot = self.vertex_slot(vertex)?;
        let next = self.first_adjacent(vertex, strategy)?;
        Ok(Adjacent {
            graph: self,
            first_in: self.vertex_at(slot).first_in,
            strategy,
            next,
        })
    }

    fn out_step(&self, slot: Option<usize>) -> Option<Step> {
        slot.map(|slot| {
            let arc = self.arc_at(slot);
            Step {
                vertex: arc.head,
                arc: arc.id,
                arc_slot: slot,
                outgoing: true,
            }
        })
    }

    fn in_step(&self, slot: Option<usize>) -> Option<Step> {
        slot.map(|slot| {
            let arc = self.arc_at(slot);
            Step {
                vertex: arc.tail,
                arc: arc.id,
                arc_slot: slot,
                outgoing: false,
            }
        })
    }

    // ============ Searches ============

    /// Recursive depth-first search from `start`.
    pub fn dfs_recursive(
        &self,
        start: VertexId,
        strategy: Strategy,
        visited: &mut VisitMap,
        visitor: &mut dyn FnMut(VertexId),
    ) -> Result<()> {
        let slot = self.vertex_slot(start)?;
        if visited.is_visited(slot) {
            return Ok(());
        }
        visitor(start);
        visited.visit(slot);
        for step in self.adjacent(start, strategy)? {
            let next = self.vertex_slot(step.vertex)?;
            if !visited.is_visited(next) {
                self.dfs_recursive(step.vertex, strategy, visited, visitor)?;
            }
        }
        Ok(())
    }

    /// Depth-first search from `start` with an explicit stack.
    ///
    /// A vertex is visited when popped; unvisited neighbors not already on the
    /// stack are pushed in adjacency order.
    pub fn dfs(
        &self,
        start: VertexId,
        strategy: Strategy,
        visited: &mut VisitMap,
        visitor: &mut dyn FnMut(VertexId),
    ) -> Result<()> {
        let start_slot = self.vertex_slot(start)?;
        if visited.is_visited(start_slot) {
            return Ok(());
        }
        let mut on_stack = vec![false; self.vertex_capacity()];
        let mut stack = vec![start];
        on_stack[start_slot] = true;

        while let Some(vertex) = stack.pop() {
            let slot = self.vertex_slot(vertex)?;
            on_stack[slot] = false;
            visitor(vertex);
            visited.visit(slot);

            for step in self.adjacent(vertex, strategy)? {
                let next = self.vertex_slot(step.vertex)?;
                if !visited.is_visited(next) && !on_stack[next] {
                    on_stack[next] = true;
                    stack.push(step.vertex);
                }
            }
        }
        Ok(())
    }

    /// Breadth-first search from `start`.
    pub fn bfs(
        &self,
        start: VertexId,
        strategy: Strategy,
        visited: &mut VisitMap,
        visitor: &mut dyn FnMut(VertexId),
    ) -> Result<()> {
        let start_slot = self.vertex_slot(start)?;
        if visited.is_visited(start_slot) {
            return Ok(());
        }
        visitor(start);
        visited.visit(start_slot);
        let mut queue = VecDeque::from([start]);

        while let Some(vertex) = queue.pop_front() {
            for step in self.adjacent(vertex, strategy)? {
                let next = self.vertex_slot(step.vertex)?;
                if !visited.is_visited(next) {
                    visitor(step.vertex);
                    visited.visit(next);
                    queue.push_back(step.vertex);
                }
            }
        }
        Ok(())
    }

    /// Run `search` from every vertex not yet reached, in arena order, so that
    /// every vertex is visited exactly once.
    pub fn traverse(
        &self,
        search: Search,
        strategy: Strategy,
        visitor: &mut dyn FnMut(VertexId),
    ) -> Result<()> {
        let mut visited = VisitMap::new(self);
        let starts: Vec<VertexId> = self.vertex_ids().collect();
        for start in starts {
            match search {
                Search::DepthFirstRecursive => {
                    self.dfs_recursive(start, strategy, &mut visited, visitor)?
                }
                Search::DepthFirst => self.dfs(start, strategy, &mut visited, visitor)?,
                Search::BreadthFirst => self.bfs(start, strategy, &mut visited, visitor)?,
            }
        }
        Ok(())
    }

    /// Partition the vertex set into connected components, treating arcs as
    /// undirected. Components are listed in arena order of their first vertex.
    pub fn connected_components(&self) -> Result<Vec<Vec<VertexId>>> {
        let mut visited = VisitMap::new(self);
        let mut components = Vec::new();
        let starts: Vec<(VertexId, usize)> = self.vertices().map(|v| (v.id(), v.slot())).collect();
        for (start, slot) in starts {
            if visited.is_visited(slot) {
                continue;
            }
            let mut component = Vec::new();
            self.dfs(start, Strategy::Edge, &mut visited, &mut |v| component.push(v))?;
            components.push(component);
        }
        Ok(components)
    }

    /// Every simple path from `start` to `end`, treating arcs as undirected.
    ///
    /// Uses a path stack plus a parallel stack holding, for each vertex on the
    /// path, the neighbors not yet tried from it. On a tree there is exactly
    /// one path between any two connected vertices.
    pub fn find_all_simple_paths(&self, start: VertexId, end: VertexId) -> Result<Vec<Vec<VertexId>>> {
        self.vertex_slot(end)?;
        if start == end {
            self.vertex_slot(start)?;
            return Ok(vec![vec![start]]);
        }

        let mut paths = Vec::new();
        let mut route = vec![start];
        let mut candidates = vec![self.fresh_neighbors(start, &route)?];

        while let Some(pending) = candidates.last_mut() {
            if pending.is_empty() {
                route.pop();
                candidates.pop();
                continue;
            }
            let next = pending.remove(0);
            route.push(next);
            if next == end {
                paths.push(route.clone());
                route.pop();
                continue;
            }
            let onward = self.fresh_neighbors(next, &route)?;
            candidates.push(onward);
        }
        Ok(paths)
    }

    /// Distinct undirected neighbors of `vertex` that are not on `route`.
    fn fresh_neighbors(&self, vertex: VertexId, route: &[VertexId]) -> Result<Vec<VertexId>> {
        let mut neighbors = Vec::new();
        for step in self.adjacent(vertex, Strategy::Edge)? {
            if !route.contains(&step.vertex) && !neighbors.contains(&step.vertex) {
                neighbors.push(step.vertex);
            }
        }
        Ok(neighbors)
    }
}

/// Iterator adapter over the cursor pair.
pub struct Adjacent<'a, V, A> {
    graph: &'a Multigraph<V, A>,
    first_in: Option<usize>,
    strategy: Strategy,
    next: Option<Step>,
}

impl<'a, V, A> Iterator for Adjacent<'a, V, A> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let current = self.next.take()?;
        self.next = self.graph.step_after(self.first_in, self.strategy, &current);
        Some(current)
    }
}
