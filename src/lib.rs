//! # RLC Sim
//!
//! Transient response of a series RLC circuit.
//!
//! This library provides:
//! - A series RLC circuit model with an optional sinusoidal source
//! - A fixed-step fourth-order Runge-Kutta integrator for charge and current
//! - Derived voltages across the resistor, inductor and capacitor
//! - Cooperative cancellation and progress reporting for background runs
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Circuit parameters and the derivative law
//! - [`solver`] - Time grid, RK4 integration and the background runner
//! - [`params`] - The eleven-scalar parameter set used by front ends
//! - [`output`] - CSV export and display downsampling
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! rlc --t1 0.05 --dt 1e-6 --resistance 10 --inductance 1e-3 --capacitance 1e-6 --progress > rlc.csv
//! ```
//!
//! ### Library
//!
//! ```
//! use rlc_sim::{Circuit, Simulation, SimulationState};
//!
//! let circuit = Circuit::new(1.0, 1.0, 1.0);
//! let mut sim = Simulation::new(circuit, 0.0, 1.0, 1.0, 0.0, 0.01)?;
//! assert_eq!(sim.solve()?, SimulationState::Completed);
//!
//! let results = sim.results(10)?;
//! assert_eq!(results.len(), 10);
//! # Ok::<(), rlc_sim::RlcError>(())
//! ```
//!
//! ## Simulation Method
//!
//! The loop equation `L·q'' + R·q' + q/C = L·E(t)` is integrated as a pair of
//! first-order equations in charge and current. Each step of length `dt`
//! takes four derivative evaluations (classic RK4). Once every step is done
//! the element voltages are derived from the completed series in one pass.

pub mod circuit;
pub mod error;
pub mod output;
pub mod params;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Circuit, SineSource};
pub use error::{Result, RlcError};
pub use params::SimulationParams;
pub use solver::{CancelHandle, Simulation, SimulationState};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmRlcSim;
