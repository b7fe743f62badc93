//! Classic fourth-order Runge-Kutta step for the RLC loop.

use crate::circuit::Circuit;

/// Instantaneous state of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopState {
    /// Capacitor charge in coulombs
    pub charge: f64,
    /// Loop current in amperes
    pub current: f64,
}

impl LoopState {
    /// Create a new loop state.
    pub fn new(charge: f64, current: f64) -> Self {
        Self { charge, current }
    }

    /// Energy stored in the inductor and the capacitor, in joules.
    pub fn energy(&self, circuit: &Circuit) -> f64 {
        0.5 * circuit.inductance * self.current * self.current
            + 0.5 * self.charge * self.charge / circuit.capacitance
    }
}

/// Advance `state` from time `t` by one step of length `dt`.
///
/// Butcher tableau:
/// ```text
/// c = [0, 1/2, 1/2, 1]
/// a = [[], [1/2], [0, 1/2], [0, 0, 1]]
/// b = [1/6, 1/3, 1/3, 1/6]
/// ```
///
/// The charge slope at each stage is the stage current; the current slope is
/// [`Circuit::derivative`].
pub fn rk4_step(circuit: &Circuit, t: f64, state: LoopState, dt: f64) -> LoopState {
    let LoopState { charge: q, current: p } = state;
    let half = dt / 2.0;

    let dp1 = dt * circuit.derivative(t, p, q);
    let dq1 = dt * p;

    let dp2 = dt * circuit.derivative(t + half, p + dp1 / 2.0, q + dq1 / 2.0);
    let dq2 = dt * (p + dp1 / 2.0);

    let dp3 = dt * circuit.derivative(t + half, p + dp2 / 2.0, q + dq2 / 2.0);
    let dq3 = dt * (p + dp2 / 2.0);

    let dp4 = dt * circuit.derivative(t + dt, p + dp3, q + dq3);
    let dq4 = dt * (p + dp3);

    LoopState {
        charge: q + (dq1 + 2.0 * dq2 + 2.0 * dq3 + dq4) / 6.0,
        current: p + (dp1 + 2.0 * dp2 + 2.0 * dp3 + dp4) / 6.0,
    }
}
