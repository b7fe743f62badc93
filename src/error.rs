//! Error types for the RLC simulator.
//!
//! This module provides a unified error type [`RlcError`] that covers
//! all error conditions that can occur while reading parameters, building
//! a simulation, and retrieving its results.

use thiserror::Error;

use crate::solver::SimulationState;

/// Result type alias using [`RlcError`].
pub type Result<T> = std::result::Result<T, RlcError>;

/// Unified error type for all simulator operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlcError {
    // ============ Configuration Errors ============
    /// A time or step value is NaN or infinite
    #[error("Parameter '{name}' must be a finite number (got {value})")]
    NonFiniteParameter { name: &'static str, value: f64 },

    /// End of the interval lies before its start
    #[error("Invalid interval: t1 ({t1}) must not be lower than t0 ({t0})")]
    InvalidInterval { t0: f64, t1: f64 },

    /// Step is longer than the whole interval
    #[error("Time step {dt} exceeds the interval length {span}")]
    StepExceedsInterval { dt: f64, span: f64 },

    /// Step is zero or negative
    #[error("Time step must be a positive number (got {dt})")]
    NonPositiveStep { dt: f64 },

    /// Interval and step describe more samples than a run may hold
    #[error("Time grid of {samples} samples exceeds the limit of {} samples", crate::solver::MAX_SAMPLES)]
    GridTooLarge { samples: f64 },

    /// Circuit values that cannot describe a physical series RLC
    #[error("Invalid circuit: {message}")]
    InvalidCircuit { message: String },

    // ============ Parameter Parsing Errors ============
    /// Wrong number of scalars for the start interface
    #[error("Expected {expected} simulation parameters, found {found}")]
    WrongParameterCount { expected: usize, found: usize },

    /// A text field did not parse as a number
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: String },

    // ============ Usage Errors ============
    /// Sampling offset must be at least 1
    #[error("Invalid offset {offset}: sampling offset must be a positive integer")]
    InvalidOffset { offset: isize },

    /// A simulation can only be solved once
    #[error("Simulation already left the idle state (state: {state})")]
    AlreadySolved { state: SimulationState },

    /// The run ended through cancellation, so no voltages were derived
    #[error("Simulation was cancelled before completion")]
    Cancelled,

    /// The worker thread stopped without delivering a terminal event
    #[error("Simulation worker terminated unexpectedly")]
    WorkerPanicked,

    // ============ I/O Errors ============
    /// Error writing results
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl RlcError {
    /// Create an invalid circuit error
    pub fn invalid_circuit(message: impl Into<String>) -> Self {
        Self::InvalidCircuit {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::OutputError {
            message: message.into(),
        }
    }
}
