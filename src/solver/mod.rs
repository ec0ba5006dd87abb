//! Loop-analysis solver.
//!
//! This module turns a connected graph of [`Element`]s into branch currents.
//!
//! ## Loop analysis
//!
//! With E branches and V vertices there are E unknown currents. Kirchhoff's
//! current law gives V-1 independent equations (one per vertex, one dropped),
//! and Kirchhoff's voltage law written over the E-V+1 fundamental loops gives
//! the rest:
//!
//! ```text
//! [ A   ]       [ 0   ]
//! [ B Z ] I  =  [ B U ]
//! ```
//!
//! where:
//! - A is the reduced incidence matrix
//! - B is the loop matrix built from the fundamental loops
//! - Z is the diagonal of branch resistances
//! - U is the vector of branch electromotive forces
//!
//! The square system is solved once by LU factorization with partial pivoting.
//!
//! Open branches are not unknowns. They carry no current, and each reads the
//! potential difference between its ends once the closed pieces are solved.

mod analysis;
mod assembly;
mod config;
mod lu;

pub use analysis::{check_kcl, solve_branches, BranchSolution};
pub use assembly::{assemble, incidence_matrix, loop_matrix, Element, LoopSystem};
pub use config::SolverConfig;
pub use lu::{DenseMatrix, LuDecomposition};

/// Default smallest accepted LU pivot magnitude.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Default relative tolerance for the post-solve KCL check.
pub const DEFAULT_KCL_TOLERANCE: f64 = 1e-9;
