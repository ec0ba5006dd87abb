//! Circuits built from two-terminal components.
//!
//! A [`CircuitDiagram`] is one connected circuit held directly in a
//! [`Multigraph`](crate::graph::Multigraph). A [`Circuit`] is a flat list of
//! branches that may fall apart into several pieces; solving it partitions
//! the branches into connected components and solves each one as its own
//! diagram.

mod component;
mod diagram;
mod network;
mod types;
mod validate;

pub use component::{Branch, ComponentKind, ComponentSpec, OPEN_CIRCUIT};
pub use diagram::CircuitDiagram;
pub use network::{Circuit, CircuitBranch};
pub use types::*;
pub use validate::validate_branch;
