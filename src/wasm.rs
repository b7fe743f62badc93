//! WASM bindings for RLC Sim.
//!
//! This module provides JavaScript-friendly bindings for plotting a run in
//! the browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmRlcSim } from 'rlc_sim';
//!
//! await init();
//!
//! // [t0, t1, dt, q0, p0, R, L, C, sourceVoltage, sourceFrequency, sourcePhase]
//! const sim = new WasmRlcSim([0, 1, 1e-4, 1, 0, 1, 1, 1, 0, 0, 0]);
//! sim.solve();
//!
//! const offset = sim.display_offset(10000);
//! const time = sim.time(offset);
//! const charge = sim.channel(0, offset);
//! ```

use wasm_bindgen::prelude::*;

use crate::error::RlcError;
use crate::output::display_offset;
use crate::params::SimulationParams;
use crate::solver::{Channel, Simulation, SimulationState};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: RlcError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible RLC simulation.
///
/// Wraps a native [`Simulation`]. The browser runs it synchronously, so
/// there is no cancellation or progress reporting on this side.
#[wasm_bindgen]
pub struct WasmRlcSim {
    simulation: Simulation,
}

#[wasm_bindgen]
impl WasmRlcSim {
    /// Create a new simulation from the eleven ordered parameters.
    ///
    /// # Returns
    /// A new `WasmRlcSim` or an error if the parameters are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(params: Vec<f64>) -> Result<WasmRlcSim, JsValue> {
        let params = SimulationParams::from_slice(&params).map_err(to_js)?;

        // Validate
        crate::circuit::validate_circuit(&params.circuit()).map_err(to_js)?;

        let simulation = params.build().map_err(to_js)?;
        Ok(WasmRlcSim { simulation })
    }

    /// Integrate the whole interval. Returns `true` when the run completed.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<bool, JsValue> {
        let state = self.simulation.solve().map_err(to_js)?;
        Ok(state == SimulationState::Completed)
    }

    /// Number of samples on the time grid.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.simulation.len()
    }

    /// Sampling offset that keeps about `max_points` points.
    #[wasm_bindgen]
    pub fn display_offset(&self, max_points: usize) -> usize {
        display_offset(self.simulation.len(), max_points)
    }

    /// Get the time grid, keeping every `offset`-th sample.
    #[wasm_bindgen]
    pub fn time(&self, offset: isize) -> Result<Vec<f64>, JsValue> {
        let results = self.simulation.results(offset).map_err(to_js)?;
        Ok(results.time.into_owned())
    }

    /// Get a series by index: charge, current, then the resistor, inductor
    /// and capacitor voltages.
    #[wasm_bindgen]
    pub fn channel(&self, index: usize, offset: isize) -> Result<Vec<f64>, JsValue> {
        let channel = Channel::from_index(index)
            .ok_or_else(|| JsValue::from_str(&format!("No channel with index {index}")))?;
        let results = self.simulation.results(offset).map_err(to_js)?;
        Ok(results.channel(channel).to_vec())
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
