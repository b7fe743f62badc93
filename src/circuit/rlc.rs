//! The series RLC loop and its derivative law.

use super::SineSource;

/// A series RLC circuit driven by an optional sinusoidal source.
///
/// The circuit is a plain value: it performs no validation and holds no
/// state beyond its parameters. Use [`validate_circuit`](super::validate_circuit)
/// when the values come from user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circuit {
    /// Resistance in ohms
    pub resistance: f64,
    /// Inductance in henries
    pub inductance: f64,
    /// Capacitance in farads
    pub capacitance: f64,
    /// Driving source
    pub source: SineSource,
}

impl Circuit {
    /// Create an undriven circuit.
    pub fn new(resistance: f64, inductance: f64, capacitance: f64) -> Self {
        Self {
            resistance,
            inductance,
            capacitance,
            source: SineSource::default(),
        }
    }

    /// Attach a driving source.
    pub fn with_source(mut self, source: SineSource) -> Self {
        self.source = source;
        self
    }

    /// Rate of change of the loop current at time `t`.
    ///
    /// `current` is the loop current `p` and `charge` the capacitor charge `q`.
    #[inline]
    pub fn derivative(&self, t: f64, current: f64, charge: f64) -> f64 {
        self.source.voltage(t)
            - self.resistance / self.inductance * current
            - charge / self.inductance / self.capacitance
    }

    /// Evaluate [`derivative`](Self::derivative) element-wise over whole series.
    ///
    /// The output has the length of the shortest input.
    pub fn derivative_series(&self, time: &[f64], current: &[f64], charge: &[f64]) -> Vec<f64> {
        time.iter()
            .zip(current)
            .zip(charge)
            .map(|((&t, &p), &q)| self.derivative(t, p, q))
            .collect()
    }

    /// Undamped angular frequency ω0 = 1/√(LC), in rad/s.
    pub fn natural_frequency(&self) -> f64 {
        1.0 / (self.inductance * self.capacitance).sqrt()
    }

    /// Damping ratio ζ = (R/2)·√(C/L).
    ///
    /// Below 1 the transient oscillates, above 1 it decays without ringing.
    pub fn damping_ratio(&self) -> f64 {
        self.resistance / 2.0 * (self.capacitance / self.inductance).sqrt()
    }
}
