//! Error types for the Kirchhoff circuit solver.
//!
//! This module provides a unified error type [`KirchhoffError`] that covers
//! all error conditions that can occur while building a graph, decomposing
//! its topology and solving the resulting linear system.

use thiserror::Error;

/// Result type alias using [`KirchhoffError`].
pub type Result<T> = std::result::Result<T, KirchhoffError>;

/// Unified error type for all Kirchhoff operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KirchhoffError {
    // ============ Graph Errors ============
    /// A vertex with this id is already present
    #[error("Vertex id {id} is already in use")]
    DuplicateVertex { id: usize },

    /// An arc with this id is already present
    #[error("Arc id {id} is already in use")]
    DuplicateArc { id: usize },

    /// An arc references an endpoint that is not in the graph
    #[error("Vertex {id} not found in graph")]
    UnknownVertex { id: usize },

    /// An arc id that is not in the graph
    #[error("Arc {id} not found in graph")]
    UnknownArc { id: usize },

    /// An arc whose tail and head are the same vertex
    #[error("Arc from vertex {vertex} to itself is not allowed")]
    SelfLoop { vertex: usize },

    /// The free-id generator ran past the end of the id range
    #[error("No free ids left in the id space")]
    IdSpaceExhausted,

    // ============ Solve Errors ============
    /// Not enough branches to build a system of equations
    #[error("Insufficient topology: {message}")]
    InsufficientTopology { message: String },

    /// The assembled system has no unique solution
    #[error("Singular system - {message}")]
    SingularSystem { message: String },

    // ============ Input Errors ============
    /// A component description that cannot be turned into a branch
    #[error("Invalid component '{spec}': {message}")]
    InvalidComponent { spec: String, message: String },
}

impl KirchhoffError {
    /// Create an insufficient topology error
    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientTopology {
            message: message.into(),
        }
    }

    /// Create a singular system error
    pub fn singular(message: impl Into<String>) -> Self {
        Self::SingularSystem {
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            spec: spec.into(),
            message: message.into(),
        }
    }
}
