//! Background execution of a simulation.
//!
//! [`spawn`] moves a [`Simulation`] onto a dedicated worker thread and
//! returns a [`RunHandle`]. The worker never touches caller state: progress
//! and the final simulation travel back over a channel that the caller
//! drains, either by polling ([`RunHandle::drain`]) or by blocking
//! ([`RunHandle::wait`]). Every run delivers exactly one terminal event,
//! after all of its progress events.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::error::{RlcError, Result};

use super::{CancelHandle, Simulation, SimulationState};

/// Notification sent from the worker to the caller.
#[derive(Debug)]
pub enum SimulationEvent {
    /// Completed percentage, strictly increasing
    Progress(u8),
    /// The run finished; all series are valid
    Completed(Box<Simulation>),
    /// The run stopped early; voltage series are not valid
    Cancelled(Box<Simulation>),
}

impl SimulationEvent {
    /// Check if this is the last event of a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationEvent::Progress(_))
    }
}

/// Receiver side of a run.
pub trait SimulationListener {
    /// Called for each progress update.
    fn on_progress(&mut self, _percent: u8) {}

    /// Called once when the run completes.
    fn on_complete(&mut self, simulation: Simulation);

    /// Called once when the run ends through cancellation.
    fn on_cancelled(&mut self, _simulation: Simulation) {}
}

/// Caller-side handle for a simulation running on a worker thread.
///
/// Dropping the handle cancels the run and waits for the worker to stop.
pub struct RunHandle {
    events: Receiver<SimulationEvent>,
    cancel: CancelHandle,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

/// Start solving `simulation` on a new worker thread.
///
/// # Errors
/// [`RlcError::AlreadySolved`] if the simulation is not idle.
pub fn spawn(simulation: Simulation) -> Result<RunHandle> {
    let state = simulation.state();
    if state != SimulationState::Idle {
        return Err(RlcError::AlreadySolved { state });
    }

    let (tx, rx) = mpsc::channel();
    let cancel = simulation.cancel_handle();

    debug!("Starting simulation worker ({} samples)", simulation.len());

    let worker = thread::spawn(move || {
        let mut simulation = simulation;

        // Sends only fail once the caller dropped its handle
        let outcome = simulation.solve_with(|percent| {
            let _ = tx.send(SimulationEvent::Progress(percent));
        });

        let event = match outcome {
            Ok(SimulationState::Completed) => SimulationEvent::Completed(Box::new(simulation)),
            Ok(_) => SimulationEvent::Cancelled(Box::new(simulation)),
            Err(err) => {
                error!("Simulation worker failed: {err}");
                return;
            }
        };
        let _ = tx.send(event);
    });

    Ok(RunHandle {
        events: rx,
        cancel,
        worker: Some(worker),
        finished: false,
    })
}

impl RunHandle {
    /// Ask the worker to stop. Idempotent; harmless after the run ended.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Get a cancellation handle that can outlive this handle.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Check if the terminal event has been received.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Receive the next pending event without blocking.
    ///
    /// Returns `Ok(None)` when nothing is pending or the run already ended.
    pub fn try_next(&mut self) -> Result<Option<SimulationEvent>> {
        if self.finished {
            return Ok(None);
        }

        match self.events.try_recv() {
            Ok(event) => {
                self.finished = event.is_terminal();
                Ok(Some(event))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RlcError::WorkerPanicked),
        }
    }

    /// Deliver every pending event to `listener` without blocking.
    ///
    /// Returns `true` once the terminal event has been delivered.
    pub fn drain<L: SimulationListener>(&mut self, listener: &mut L) -> Result<bool> {
        while let Some(event) = self.try_next()? {
            dispatch(event, listener);
        }
        Ok(self.finished)
    }

    /// Block until the run ends, delivering every event to `listener`.
    pub fn wait<L: SimulationListener>(mut self, listener: &mut L) -> Result<()> {
        while !self.finished {
            let event = self.events.recv().map_err(|_| RlcError::WorkerPanicked)?;
            self.finished = event.is_terminal();
            dispatch(event, listener);
        }

        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| RlcError::WorkerPanicked)?;
        }
        Ok(())
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.cancel.cancel();
            if worker.join().is_err() {
                error!("Simulation worker panicked during shutdown");
            }
        }
    }
}

fn dispatch<L: SimulationListener>(event: SimulationEvent, listener: &mut L) {
    match event {
        SimulationEvent::Progress(percent) => listener.on_progress(percent),
        SimulationEvent::Completed(simulation) => listener.on_complete(*simulation),
        SimulationEvent::Cancelled(simulation) => listener.on_cancelled(*simulation),
    }
}
