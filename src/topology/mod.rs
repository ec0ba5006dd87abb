//! Spanning tree / co-tree decomposition.
//!
//! For a connected graph with V vertices and E arcs, a spanning tree holds
//! V-1 arcs and the remaining E-V+1 co-tree arcs ("links") each close exactly
//! one fundamental loop with the unique tree path between their endpoints.
//! Those loops form a basis of the cycle space, which is what the loop
//! equations of the solver are written over.

mod loops;
mod tree;

pub use loops::{fundamental_loops, BasicLoop};
pub use tree::{spanning_tree, TreePartition};
