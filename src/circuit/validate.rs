//! Branch validation.

use crate::error::{KirchhoffError, Result};
use crate::graph::VertexId;

use super::component::Branch;

/// Validate a branch before it is placed in a graph.
///
/// Checks:
/// - The branch joins two different junctions
/// - Resistance is a non-negative number (infinite only for an open branch)
/// - EMF is finite
pub fn validate_branch(tail: VertexId, head: VertexId, branch: &Branch) -> Result<()> {
    if tail == head {
        return Err(KirchhoffError::SelfLoop { vertex: tail.0 });
    }

    let describe = || format!("{} {}->{}", branch.kind, tail, head);

    if branch.resistance.is_nan() || branch.resistance < 0.0 {
        return Err(KirchhoffError::invalid_component(
            describe(),
            "resistance must be a non-negative number",
        ));
    }

    if !branch.emf.is_finite() {
        return Err(KirchhoffError::invalid_component(
            describe(),
            "electromotive force must be finite",
        ));
    }

    Ok(())
}
