//! Core types for circuit representation.

use std::fmt;

use crate::graph::VertexId;

/// Handle to a branch added to a [`Circuit`](super::Circuit).
/// Handles are dense indices in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchHandle(pub usize);

impl fmt::Display for BranchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Vertex payload for circuit junctions. Junctions carry no numeric data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Junction;

impl From<usize> for VertexId {
    fn from(id: usize) -> Self {
        VertexId(id)
    }
}
