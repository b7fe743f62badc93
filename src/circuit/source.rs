//! Sinusoidal voltage source.

use std::f64::consts::TAU;

/// A sinusoidal electromotive force driving the loop.
///
/// The source produces `amplitude · sin(2π·frequency·t + phase)`.
/// A zero amplitude (the default) leaves the circuit undriven.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SineSource {
    /// Peak electromotive force in volts
    pub amplitude: f64,
    /// Frequency in hertz
    pub frequency: f64,
    /// Offset added to the sinusoid argument
    pub phase: f64,
}

impl SineSource {
    /// Create a new sinusoidal source.
    pub fn new(amplitude: f64, frequency: f64, phase: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase,
        }
    }

    /// Get the source voltage at time `t`.
    pub fn voltage(&self, t: f64) -> f64 {
        self.amplitude * (TAU * self.frequency * t + self.phase).sin()
    }

    /// Check if the source contributes anything.
    pub fn is_zero(&self) -> bool {
        self.amplitude == 0.0
    }
}
