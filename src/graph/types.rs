//! Core identifier types for the multigraph.

use std::fmt;

/// A caller-visible identifier for a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A caller-visible identifier for an arc.
/// Parallel arcs between the same pair of vertices differ only by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(pub usize);

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which incident arcs an adjacency cursor walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Outgoing arcs only (neighbor is the arc head)
    Out,
    /// Incoming arcs only (neighbor is the arc tail)
    In,
    /// Outgoing arcs first, then incoming arcs.
    /// Treats the graph as undirected.
    Edge,
}

/// Search order used by [`Multigraph::traverse`](super::Multigraph::traverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Search {
    /// Depth-first, recursive
    DepthFirstRecursive,
    /// Depth-first with an explicit stack
    DepthFirst,
    /// Breadth-first with a queue
    BreadthFirst,
}
