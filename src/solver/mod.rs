//! Fixed-step transient solver.
//!
//! This module provides the numerical engine for the series RLC circuit.
//!
//! ## State equations
//!
//! The second-order loop equation is integrated as a first-order system in
//! the capacitor charge `q` and the loop current `p`:
//!
//! ```text
//! dq/dt = p
//! dp/dt = E(t) − (R/L)·p − q/(L·C)
//! ```
//!
//! Each step uses the classic fourth-order Runge-Kutta scheme with a fixed
//! step `dt`. After the last step the voltage across each element is derived
//! from the completed series:
//!
//! ```text
//! v_R = R·p
//! v_L = −L·dp/dt
//! v_C = q/C
//! ```

mod results;
mod rk4;
pub mod runner;
mod simulation;

pub use results::{Channel, SimulationResults};
pub use rk4::{rk4_step, LoopState};
pub use runner::{RunHandle, SimulationEvent, SimulationListener};
pub use simulation::{CancelHandle, Simulation, SimulationState};

/// Largest time grid a simulation may allocate.
///
/// Each sample holds six `f64` values, so this caps a run at about 1.6 GB.
pub const MAX_SAMPLES: usize = 1 << 25;

/// Largest reported progress value.
pub const PROGRESS_COMPLETE: u8 = 100;
