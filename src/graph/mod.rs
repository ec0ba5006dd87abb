//! Directed multigraph with intrusive adjacency lists.
//!
//! This module provides the graph abstraction the circuit layer is built on.
//! The [`Multigraph`] container is generic over vertex and arc payloads and
//! knows nothing about electricity: it offers insertion and removal, adjacency
//! cursors parameterized by a [`Strategy`], depth-first and breadth-first
//! searches, simple-path enumeration and connected-component partitioning.

mod multigraph;
mod primitives;
mod traversal;
mod types;

pub use multigraph::{IncidentArcs, Multigraph};
pub use primitives::{ArcRecord, VertexRecord};
pub use traversal::{Adjacent, Step, VisitMap};
pub use types::{ArcId, Search, Strategy, VertexId};
