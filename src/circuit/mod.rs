//! Series RLC circuit model.
//!
//! The [`Circuit`] struct holds the three passive element values and the
//! sinusoidal driving source. It exposes the derivative law of the loop
//! current that the solver integrates:
//!
//! ```text
//! dp/dt = E·sin(2π·f·t + φ) − (R/L)·p − q/(L·C)
//! ```
//!
//! where `q` is the capacitor charge and `p = dq/dt` the loop current.

mod rlc;
mod source;
mod validate;

pub use rlc::Circuit;
pub use source::SineSource;
pub use validate::validate_circuit;
