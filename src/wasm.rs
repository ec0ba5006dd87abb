//! WASM bindings for Kirchhoff Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuit } from 'kirchhoff_core';
//!
//! await init();
//!
//! const circuit = new WasmCircuit();
//! circuit.add_battery(0, 1, 10);
//! const r = circuit.add_resistor(1, 2, 2.5);
//! circuit.add_wire(2, 0);
//! const currents = circuit.solve();
//! console.log(currents[r]); // 4
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{BranchHandle, Circuit, ComponentSpec};
use crate::solver::SolverConfig;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible circuit.
///
/// Junction ids are plain numbers. Every `add_*` method returns the index of
/// the new branch in the arrays returned by [`solve`](Self::solve) and
/// [`voltages`](Self::voltages).
#[wasm_bindgen]
pub struct WasmCircuit {
    circuit: Circuit,
}

#[wasm_bindgen]
impl WasmCircuit {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCircuit {
        WasmCircuit {
            circuit: Circuit::new(),
        }
    }

    /// Create a circuit that checks Kirchhoff's current law after solving.
    #[wasm_bindgen]
    pub fn with_kcl_check(tolerance: f64) -> WasmCircuit {
        let config = SolverConfig::new()
            .with_kcl_check(true)
            .with_kcl_tolerance(tolerance);
        WasmCircuit {
            circuit: Circuit::with_config(config),
        }
    }

    #[wasm_bindgen]
    pub fn add_wire(&mut self, tail: usize, head: usize) -> usize {
        self.circuit.add_wire(tail, head).0
    }

    #[wasm_bindgen]
    pub fn add_resistor(&mut self, tail: usize, head: usize, resistance: f64) -> usize {
        self.circuit.add_resistor(tail, head, resistance).0
    }

    #[wasm_bindgen]
    pub fn add_battery(&mut self, tail: usize, head: usize, emf: f64) -> usize {
        self.circuit.add_battery(tail, head, emf).0
    }

    #[wasm_bindgen]
    pub fn add_battery_with_resistance(
        &mut self,
        tail: usize,
        head: usize,
        emf: f64,
        internal_resistance: f64,
    ) -> usize {
        self.circuit
            .add_battery_with_resistance(tail, head, emf, internal_resistance)
            .0
    }

    #[wasm_bindgen]
    pub fn add_ammeter(&mut self, tail: usize, head: usize) -> usize {
        self.circuit.add_ammeter(tail, head).0
    }

    #[wasm_bindgen]
    pub fn add_voltmeter(&mut self, tail: usize, head: usize) -> usize {
        self.circuit.add_voltmeter(tail, head).0
    }

    /// Parse and add a component written as `KIND:TAIL:HEAD[:VALUE[:INTERNAL_R]]`.
    #[wasm_bindgen]
    pub fn add_component(&mut self, spec: &str) -> Result<usize, JsValue> {
        let spec = spec
            .parse::<ComponentSpec>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.circuit.add_spec(spec).0)
    }

    /// Solve the circuit and return the branch currents in insertion order.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<Vec<f64>, JsValue> {
        self.circuit
            .solve()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.circuit.branches().iter().map(|b| b.branch.current).collect())
    }

    /// Branch voltages from the last solve, in insertion order.
    #[wasm_bindgen]
    pub fn voltages(&self) -> Vec<f64> {
        self.circuit.branches().iter().map(|b| b.branch.voltage).collect()
    }

    /// Current through one branch, or `undefined` for an unknown index.
    #[wasm_bindgen]
    pub fn current(&self, branch: usize) -> Option<f64> {
        self.circuit.current(BranchHandle(branch))
    }

    /// Number of branches.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.circuit.len()
    }

    /// Crate version.
    #[wasm_bindgen]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

impl Default for WasmCircuit {
    fn default() -> Self {
        Self::new()
    }
}
