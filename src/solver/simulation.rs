//! A single transient run of the RLC circuit.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};

use crate::circuit::Circuit;
use crate::error::{RlcError, Result};

use super::results::SimulationResults;
use super::rk4::{rk4_step, LoopState};
use super::{MAX_SAMPLES, PROGRESS_COMPLETE};

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Constructed, not yet solved
    Idle,
    /// Inside [`Simulation::solve`]
    Running,
    /// Every step integrated and the voltages derived
    Completed,
    /// Stopped by a cancellation request; voltages are not valid
    Cancelled,
}

impl SimulationState {
    /// Check if the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Shared cancellation flag for a [`Simulation`].
///
/// Clones refer to the same flag, so a handle can be moved to another thread
/// and used to stop a run that is being solved elsewhere. The integration
/// loop reads the flag once per step.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Time grid, integrated state and derived voltages of one run.
///
/// The time grid holds `N = ceil((t1 - t0) / dt)` samples starting at `t0`
/// (inclusive) and stopping before `t1`. Every series has exactly `N`
/// entries aligned with the grid.
///
/// `N` is computed in floating point, so when `(t1 - t0) / dt` lands just
/// above an integer the last sample can round onto `t1` itself. For example
/// `t0 = 0.1`, `t1 = 0.4`, `dt = 0.1` gives four samples, the last one at
/// `0.4`. Charge and current start at the supplied
/// initial conditions; the voltage series stay zero until a run completes.
///
/// A simulation is solved at most once. Construct a new one to run again.
#[derive(Debug)]
pub struct Simulation {
    circuit: Circuit,
    dt: f64,
    time: Vec<f64>,
    charge: Vec<f64>,
    current: Vec<f64>,
    resistor_voltage: Vec<f64>,
    inductor_voltage: Vec<f64>,
    capacitor_voltage: Vec<f64>,
    cancel: CancelHandle,
    state: SimulationState,
    /// Number of leading samples holding integrated (or initial) values
    filled: usize,
}

impl Simulation {
    /// Create a new simulation over `[t0, t1)` with step `dt`.
    ///
    /// `q0` and `p0` are the initial charge and current at `t0`.
    ///
    /// # Errors
    /// Checked in this order, before anything is allocated:
    /// - [`RlcError::NonFiniteParameter`] if `t0`, `t1` or `dt` is NaN or infinite
    /// - [`RlcError::InvalidInterval`] if `t1 < t0`
    /// - [`RlcError::StepExceedsInterval`] if `dt > t1 - t0`
    /// - [`RlcError::NonPositiveStep`] if `dt <= 0`
    /// - [`RlcError::GridTooLarge`] if the grid would exceed [`MAX_SAMPLES`]
    pub fn new(circuit: Circuit, t0: f64, t1: f64, q0: f64, p0: f64, dt: f64) -> Result<Self> {
        for (name, value) in [("t0", t0), ("t1", t1), ("dt", dt)] {
            if !value.is_finite() {
                return Err(RlcError::NonFiniteParameter { name, value });
            }
        }

        if t1 < t0 {
            return Err(RlcError::InvalidInterval { t0, t1 });
        }

        let span = t1 - t0;
        if dt > span {
            return Err(RlcError::StepExceedsInterval { dt, span });
        }

        if dt <= 0.0 {
            return Err(RlcError::NonPositiveStep { dt });
        }

        let samples = (span / dt).ceil();
        if samples > MAX_SAMPLES as f64 {
            return Err(RlcError::GridTooLarge { samples });
        }

        let steps = (samples as usize).max(1);
        let time: Vec<f64> = (0..steps).map(|i| t0 + i as f64 * dt).collect();

        let mut charge = vec![0.0; steps];
        charge[0] = q0;

        let mut current = vec![0.0; steps];
        current[0] = p0;

        debug!("Simulation grid: {steps} samples from {t0} s, dt = {dt} s");

        Ok(Self {
            circuit,
            dt,
            time,
            charge,
            current,
            resistor_voltage: vec![0.0; steps],
            inductor_voltage: vec![0.0; steps],
            capacitor_voltage: vec![0.0; steps],
            cancel: CancelHandle::default(),
            state: SimulationState::Idle,
            filled: 1,
        })
    }

    /// Run the integration without progress reporting.
    ///
    /// See [`solve_with`](Self::solve_with).
    pub fn solve(&mut self) -> Result<SimulationState> {
        self.solve_with(|_| {})
    }

    /// Integrate every step, reporting progress through `on_progress`.
    ///
    /// `on_progress` receives the completed percentage, rounded to an
    /// integer, each time it changes. Values are strictly increasing and a
    /// completed run always ends with 100.
    ///
    /// A cancellation request is observed at the top of the next step, so at
    /// most one more step is integrated after [`kill`](Self::kill). A
    /// cancelled run keeps its partially filled charge and current and skips
    /// the voltage derivation.
    ///
    /// Returns the terminal state, or [`RlcError::AlreadySolved`] if the
    /// simulation is not idle.
    pub fn solve_with<F>(&mut self, mut on_progress: F) -> Result<SimulationState>
    where
        F: FnMut(u8),
    {
        if self.state != SimulationState::Idle {
            return Err(RlcError::AlreadySolved { state: self.state });
        }
        self.state = SimulationState::Running;

        let steps = self.time.len();
        let mut progress = 0u8;

        for i in 1..steps {
            if self.cancel.is_cancelled() {
                break;
            }

            let previous = LoopState::new(self.charge[i - 1], self.current[i - 1]);
            let next = rk4_step(&self.circuit, self.time[i - 1], previous, self.dt);
            self.charge[i] = next.charge;
            self.current[i] = next.current;
            self.filled = i + 1;

            let percent = (100.0 * i as f64 / steps as f64).round_ties_even() as u8;
            if percent != progress {
                trace!("Simulation progress: {percent}%");
                on_progress(percent);
                progress = percent;
            }
        }

        if self.cancel.is_cancelled() {
            self.state = SimulationState::Cancelled;
            info!(
                "Simulation cancelled after {} of {steps} samples",
                self.filled
            );
            return Ok(self.state);
        }

        self.derive_voltages();
        self.state = SimulationState::Completed;
        info!("Simulation completed: {steps} samples");

        if progress != PROGRESS_COMPLETE {
            on_progress(PROGRESS_COMPLETE);
        }

        Ok(self.state)
    }

    /// Compute the three element voltages over the whole grid.
    fn derive_voltages(&mut self) {
        let Circuit {
            resistance,
            inductance,
            capacitance,
            ..
        } = self.circuit;

        self.resistor_voltage = self.current.iter().map(|p| p * resistance).collect();
        self.inductor_voltage = self
            .circuit
            .derivative_series(&self.time, &self.current, &self.charge)
            .into_iter()
            .map(|dp| -inductance * dp)
            .collect();
        self.capacitor_voltage = self.charge.iter().map(|q| q / capacitance).collect();
    }

    /// Request cancellation of the run.
    ///
    /// Idempotent. A request made before [`solve`](Self::solve) is honored
    /// on the first step. To cancel from another thread while this value is
    /// borrowed by the solver, use [`cancel_handle`](Self::cancel_handle).
    pub fn kill(&self) {
        self.cancel.cancel();
    }

    /// Get a handle that cancels this simulation from anywhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Sample the results, keeping every `offset`-th point from index 0.
    ///
    /// With `offset == 1` the stored series are borrowed as-is. Larger
    /// offsets produce `ceil(N / offset)` points; the tail is truncated,
    /// never padded.
    ///
    /// # Errors
    /// [`RlcError::InvalidOffset`] if `offset < 1`.
    pub fn results(&self, offset: isize) -> Result<SimulationResults<'_>> {
        match offset {
            1 => Ok(SimulationResults::borrowed(self)),
            k if k > 1 => Ok(SimulationResults::sampled(self, k as usize)),
            _ => Err(RlcError::InvalidOffset { offset }),
        }
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Get the circuit being simulated.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get the time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of samples on the time grid.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always false: a grid holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of leading samples that hold initial or integrated values.
    ///
    /// Equals [`len`](Self::len) for a completed run.
    pub fn filled_len(&self) -> usize {
        self.filled
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn charge(&self) -> &[f64] {
        &self.charge
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn resistor_voltage(&self) -> &[f64] {
        &self.resistor_voltage
    }

    pub fn inductor_voltage(&self) -> &[f64] {
        &self.inductor_voltage
    }

    pub fn capacitor_voltage(&self) -> &[f64] {
        &self.capacitor_voltage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::SineSource;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::borrow::Cow;

    fn lc_oscillator() -> Circuit {
        Circuit::new(0.0, 1.0, 1.0)
    }

    /// Max deviation of the charge from cos(t) for an LC tank with ω0 = 1.
    fn lc_max_error(dt: f64) -> f64 {
        let mut sim = Simulation::new(lc_oscillator(), 0.0, 10.0, 1.0, 0.0, dt).unwrap();
        sim.solve().unwrap();
        sim.time()
            .iter()
            .zip(sim.charge())
            .map(|(t, q)| (q - t.cos()).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_grid_length() {
        let cases = [
            (0.0, 1.0, 0.01, 100),
            (0.0, 1.0, 0.3, 4),
            (2.0, 3.0, 0.25, 4),
            (0.0, 1.0, 1.0, 1),
            (-1.0, 1.0, 0.5, 4),
        ];

        for (t0, t1, dt, expected) in cases {
            let sim = Simulation::new(lc_oscillator(), t0, t1, 0.0, 0.0, dt).unwrap();
            let time = sim.time();
            assert_eq!(sim.len(), expected, "t0={t0} t1={t1} dt={dt}");
            assert_eq!(time[0], t0);
            let last = time[expected - 1];
            assert!(last < t1);
            assert!(t1 <= last + dt + 1e-12);
            for series in [sim.charge(), sim.current(), sim.resistor_voltage()] {
                assert_eq!(series.len(), expected);
            }
        }
    }

    #[test]
    fn test_validation_order() {
        let c = lc_oscillator();

        // Reversed interval wins over a bad step
        assert!(matches!(
            Simulation::new(c, 1.0, 0.0, 0.0, 0.0, -1.0),
            Err(RlcError::InvalidInterval { .. })
        ));
        assert!(matches!(
            Simulation::new(c, 0.0, 1.0, 0.0, 0.0, 2.0),
            Err(RlcError::StepExceedsInterval { .. })
        ));
        assert!(matches!(
            Simulation::new(c, 0.0, 1.0, 0.0, 0.0, 0.0),
            Err(RlcError::NonPositiveStep { .. })
        ));
        assert!(matches!(
            Simulation::new(c, 0.0, 1.0, 0.0, 0.0, -0.1),
            Err(RlcError::NonPositiveStep { .. })
        ));
        // Empty interval: any positive step is too long
        assert!(matches!(
            Simulation::new(c, 1.0, 1.0, 0.0, 0.0, 0.1),
            Err(RlcError::StepExceedsInterval { .. })
        ));
        assert!(matches!(
            Simulation::new(c, 0.0, f64::NAN, 0.0, 0.0, 0.1),
            Err(RlcError::NonFiniteParameter { name: "t1", .. })
        ));
    }

    #[test]
    fn test_grid_size_is_bounded() {
        let c = lc_oscillator();
        assert!(matches!(
            Simulation::new(c, 0.0, 1e12, 0.0, 0.0, 1e-6),
            Err(RlcError::GridTooLarge { samples }) if samples > MAX_SAMPLES as f64
        ));
        assert!(matches!(
            Simulation::new(c, 0.0, f64::MAX, 0.0, 0.0, f64::MIN_POSITIVE),
            Err(RlcError::GridTooLarge { .. })
        ));
        // The ordered checks still come first
        assert!(matches!(
            Simulation::new(c, 0.0, 1e12, 0.0, 0.0, -1e-6),
            Err(RlcError::NonPositiveStep { .. })
        ));

        let dt = 1.0 / 1024.0;
        let limit = MAX_SAMPLES as f64 * dt;
        assert!(matches!(
            Simulation::new(c, 0.0, limit + dt, 0.0, 0.0, dt),
            Err(RlcError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_grid_end_can_round_onto_t1() {
        let sim = Simulation::new(lc_oscillator(), 0.1, 0.4, 0.0, 0.0, 0.1).unwrap();
        assert_eq!(sim.len(), 4);
        assert_relative_eq!(sim.time()[3], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_conditions() {
        let sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 0.5, -2.0, 0.1).unwrap();
        assert_eq!(sim.state(), SimulationState::Idle);
        assert_eq!(sim.charge()[0], 0.5);
        assert_eq!(sim.current()[0], -2.0);
        assert_eq!(sim.filled_len(), 1);
        assert!(sim.charge()[1..].iter().all(|&q| q == 0.0));
        assert!(sim.capacitor_voltage().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_damped_example() {
        let mut sim =
            Simulation::new(Circuit::new(1.0, 1.0, 1.0), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        assert_eq!(sim.solve().unwrap(), SimulationState::Completed);

        assert_eq!(sim.len(), 100);
        assert_eq!(sim.charge()[0], 1.0);
        assert_eq!(sim.current()[0], 0.0);
        assert_eq!(sim.resistor_voltage()[0], 0.0);
        assert_eq!(sim.filled_len(), 100);

        // Charge drains through the loop
        let charge = sim.charge();
        assert!(charge[99] < charge[0]);
        assert!(charge.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_voltages_cover_index_zero() {
        let circuit = Circuit::new(3.0, 0.5, 0.2);
        let mut sim = Simulation::new(circuit, 0.0, 1.0, 0.4, 2.0, 0.01).unwrap();
        sim.solve().unwrap();

        assert_relative_eq!(sim.resistor_voltage()[0], 6.0, epsilon = 1e-12);
        assert_relative_eq!(sim.capacitor_voltage()[0], 2.0, epsilon = 1e-12);
        // -L·(-(R/L)·p - q/(LC)) = R·p + q/C
        assert_relative_eq!(sim.inductor_voltage()[0], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_element_voltages_balance_source() {
        // v_L is reported as -L·dp/dt, so v_R + v_C - v_L = L·E(t)
        let source = SineSource::new(5.0, 3.0, 0.1);
        let circuit = Circuit::new(2.0, 0.5, 0.05).with_source(source);
        let mut sim = Simulation::new(circuit, 0.0, 2.0, 0.0, 0.0, 1e-3).unwrap();
        sim.solve().unwrap();

        for i in 0..sim.len() {
            let balance = sim.resistor_voltage()[i] + sim.capacitor_voltage()[i]
                - sim.inductor_voltage()[i];
            assert_abs_diff_eq!(
                balance,
                circuit.inductance * source.voltage(sim.time()[i]),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_lc_tracks_analytic_solution() {
        assert!(lc_max_error(0.01) < 1e-8);
    }

    #[test]
    fn test_lc_error_is_fourth_order() {
        let coarse = lc_max_error(0.02);
        let fine = lc_max_error(0.01);
        let ratio = coarse / fine;
        // Halving dt divides a fourth-order error by 16
        assert!(ratio > 12.0 && ratio < 20.0, "ratio = {ratio}");
    }

    #[test]
    fn test_lc_energy_drift() {
        let circuit = Circuit::new(0.0, 0.5, 2.0);
        let mut sim = Simulation::new(circuit, 0.0, 20.0, 1.0, 0.5, 0.01).unwrap();
        sim.solve().unwrap();

        let initial = LoopState::new(1.0, 0.5).energy(&circuit);
        for (&q, &p) in sim.charge().iter().zip(sim.current()) {
            let energy = LoopState::new(q, p).energy(&circuit);
            assert_relative_eq!(energy, initial, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_progress_is_strictly_increasing() {
        let mut sim =
            Simulation::new(Circuit::new(1.0, 1.0, 1.0), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        let mut events = Vec::new();
        sim.solve_with(|p| events.push(p)).unwrap();

        assert!(events.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(events.first(), Some(&1));
        assert_eq!(events.last(), Some(&100));
        // 99 in-loop updates plus the completion report
        assert_eq!(events.len(), 100);
    }

    #[test]
    fn test_progress_for_long_run_has_no_duplicates() {
        let mut sim =
            Simulation::new(Circuit::new(1.0, 1.0, 1.0), 0.0, 8.0, 1.0, 0.0, 1.0 / 1024.0)
                .unwrap();
        let mut events = Vec::new();
        sim.solve_with(|p| events.push(p)).unwrap();

        assert_eq!(events, (1..=100).collect::<Vec<u8>>());
    }

    #[test]
    fn test_single_sample_run() {
        let mut sim = Simulation::new(Circuit::new(2.0, 1.0, 1.0), 0.0, 1.0, 1.0, 3.0, 1.0)
            .unwrap();
        let mut events = Vec::new();
        assert_eq!(
            sim.solve_with(|p| events.push(p)).unwrap(),
            SimulationState::Completed
        );
        assert_eq!(events, vec![100]);
        assert_eq!(sim.resistor_voltage(), &[6.0]);
    }

    #[test]
    fn test_kill_during_run() {
        let mut sim =
            Simulation::new(Circuit::new(0.5, 1.0, 1.0), 0.0, 8.0, 1.0, 0.0, 1.0 / 1024.0)
                .unwrap();
        let steps = sim.len();
        let handle = sim.cancel_handle();
        let mut events = Vec::new();

        let state = sim
            .solve_with(|p| {
                events.push(p);
                if p >= 30 {
                    handle.cancel();
                }
            })
            .unwrap();

        assert_eq!(state, SimulationState::Cancelled);
        assert_eq!(events.last(), Some(&30));

        // The step that reported 30% is the last one integrated
        let kill_index = (1..steps)
            .find(|&i| (100.0 * i as f64 / steps as f64).round_ties_even() >= 30.0)
            .unwrap();
        assert_eq!(sim.filled_len(), kill_index + 1);
        assert!(sim.filled_len() < steps / 2);

        assert!(sim.charge()[sim.filled_len()..].iter().all(|&q| q == 0.0));
        assert!(sim.current()[sim.filled_len()..].iter().all(|&p| p == 0.0));
        for series in [
            sim.resistor_voltage(),
            sim.inductor_voltage(),
            sim.capacitor_voltage(),
        ] {
            assert!(series.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_kill_before_solve() {
        let mut sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        sim.kill();
        sim.kill();

        let mut events = Vec::new();
        assert_eq!(
            sim.solve_with(|p| events.push(p)).unwrap(),
            SimulationState::Cancelled
        );
        assert!(events.is_empty());
        assert_eq!(sim.filled_len(), 1);
        assert!(sim.capacitor_voltage().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_solve_is_not_reentrant() {
        let mut sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 1.0, 0.0, 0.1).unwrap();
        sim.solve().unwrap();
        assert_eq!(
            sim.solve(),
            Err(RlcError::AlreadySolved {
                state: SimulationState::Completed
            })
        );
        // Cancelling a finished run changes nothing
        sim.kill();
        assert_eq!(sim.state(), SimulationState::Completed);
    }

    #[test]
    fn test_results_full_borrows_storage() {
        let mut sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        sim.solve().unwrap();

        let results = sim.results(1).unwrap();
        assert!(matches!(results.time, Cow::Borrowed(_)));
        assert!(std::ptr::eq(results.time.as_ptr(), sim.time().as_ptr()));
        assert_eq!(&*results.charge, sim.charge());
        assert_eq!(&*results.current, sim.current());
        assert_eq!(&*results.resistor_voltage, sim.resistor_voltage());
        assert_eq!(&*results.inductor_voltage, sim.inductor_voltage());
        assert_eq!(&*results.capacitor_voltage, sim.capacitor_voltage());
    }

    #[test]
    fn test_results_downsampled() {
        let mut sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        sim.solve().unwrap();

        let results = sim.results(3).unwrap();
        assert_eq!(results.len(), 34);
        assert_eq!(results.time[0], 0.0);
        for w in results.time.windows(2) {
            assert_relative_eq!(w[1] - w[0], 0.03, epsilon = 1e-12);
        }
        for (j, &q) in results.charge.iter().enumerate() {
            assert_eq!(q, sim.charge()[3 * j]);
        }

        // An offset past the end keeps only the first sample
        assert_eq!(sim.results(1000).unwrap().len(), 1);
    }

    #[test]
    fn test_results_reject_bad_offsets() {
        let sim = Simulation::new(lc_oscillator(), 0.0, 1.0, 1.0, 0.0, 0.01).unwrap();
        assert_eq!(
            sim.results(-1).unwrap_err(),
            RlcError::InvalidOffset { offset: -1 }
        );
        assert!(matches!(
            sim.results(0),
            Err(RlcError::InvalidOffset { offset: 0 })
        ));
    }
}
