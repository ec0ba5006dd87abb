//! # Kirchhoff Core
//!
//! A DC circuit solver built on a directed multigraph.
//!
//! This library provides:
//! - A generic directed multigraph with intrusive adjacency lists, adjacency
//!   cursors, depth-first and breadth-first searches and connected components
//! - Spanning tree / co-tree decomposition and fundamental loops
//! - Loop analysis: Kirchhoff's current and voltage laws assembled into one
//!   square system and solved by LU factorization
//! - Circuits of wires, resistors, batteries, ammeters and voltmeters, solved
//!   one connected component at a time
//!
//! ## Architecture
//!
//! - [`graph`] - Multigraph container and traversal (knows nothing about circuits)
//! - [`topology`] - Spanning tree and fundamental loops
//! - [`solver`] - Matrix assembly and dense linear solve
//! - [`circuit`] - Components, connected diagrams and the orchestrating [`Circuit`]
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! kirchhoff E:0:1:10 R:1:2:2.5 A:2:3 W:3:0 V:1:0
//! ```
//!
//! ### Library
//!
//! ```
//! use kirchhoff_core::Circuit;
//!
//! let mut circuit = Circuit::new();
//! circuit.add_battery(0, 1, 10.0);
//! let r = circuit.add_resistor(1, 2, 2.5);
//! circuit.add_ammeter(2, 3);
//! circuit.add_wire(3, 0);
//! let v = circuit.add_voltmeter(1, 0);
//! circuit.solve().unwrap();
//!
//! assert!((circuit.current(r).unwrap() - 4.0).abs() < 1e-9);
//! assert!((circuit.voltage(v).unwrap() - 10.0).abs() < 1e-9);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuit } from 'kirchhoff_core';
//!
//! const circuit = new WasmCircuit();
//! circuit.add_battery(0, 1, 10);
//! circuit.add_resistor(1, 0, 2.5);
//! const currents = circuit.solve();
//! ```

pub mod circuit;
pub mod error;
pub mod graph;
pub mod solver;
pub mod topology;

// Re-export main types for convenience
pub use circuit::{Branch, BranchHandle, Circuit, CircuitDiagram, ComponentKind};
pub use error::{KirchhoffError, Result};
pub use graph::{ArcId, Multigraph, Strategy, VertexId};
pub use solver::SolverConfig;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuit;
