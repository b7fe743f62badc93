//! The scalar parameter set that starts a run.
//!
//! Front ends collect eleven numbers in a fixed order:
//!
//! | # | name               | unit |
//! |---|--------------------|------|
//! | 0 | start time         | s    |
//! | 1 | end time           | s    |
//! | 2 | step               | s    |
//! | 3 | initial charge     | C    |
//! | 4 | initial current    | A    |
//! | 5 | resistance         | Ω    |
//! | 6 | inductance         | H    |
//! | 7 | capacitance        | F    |
//! | 8 | source voltage     | V    |
//! | 9 | source frequency   | Hz   |
//! | 10| source phase       | s    |

use crate::circuit::{Circuit, SineSource};
use crate::error::{RlcError, Result};
use crate::solver::Simulation;

/// Number of scalars in a parameter set.
pub const PARAMETER_COUNT: usize = 11;

/// Parameter names, in input order.
pub const PARAMETER_NAMES: [&str; PARAMETER_COUNT] = [
    "start time",
    "end time",
    "step",
    "initial charge",
    "initial current",
    "resistance",
    "inductance",
    "capacitance",
    "source voltage",
    "source frequency",
    "source phase",
];

/// Everything needed to build a [`Circuit`] and its [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub t0: f64,
    pub t1: f64,
    pub dt: f64,
    pub q0: f64,
    pub p0: f64,
    pub resistance: f64,
    pub inductance: f64,
    pub capacitance: f64,
    pub source_voltage: f64,
    pub source_frequency: f64,
    pub source_phase: f64,
}

impl SimulationParams {
    /// Read a parameter set from its eleven ordered scalars.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: &[f64; PARAMETER_COUNT] =
            values.try_into().map_err(|_| RlcError::WrongParameterCount {
                expected: PARAMETER_COUNT,
                found: values.len(),
            })?;

        let [
            t0,
            t1,
            dt,
            q0,
            p0,
            resistance,
            inductance,
            capacitance,
            source_voltage,
            source_frequency,
            source_phase,
        ] = *values;

        Ok(Self {
            t0,
            t1,
            dt,
            q0,
            p0,
            resistance,
            inductance,
            capacitance,
            source_voltage,
            source_frequency,
            source_phase,
        })
    }

    /// Parse a parameter set from eleven text fields.
    ///
    /// Surrounding whitespace is ignored. The first field that is not a
    /// number is reported by name.
    pub fn from_strs<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        if fields.len() != PARAMETER_COUNT {
            return Err(RlcError::WrongParameterCount {
                expected: PARAMETER_COUNT,
                found: fields.len(),
            });
        }

        let values = fields
            .iter()
            .zip(PARAMETER_NAMES)
            .map(|(field, name)| {
                let text = field.as_ref().trim();
                text.parse::<f64>().map_err(|_| RlcError::InvalidParameter {
                    name,
                    value: text.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Self::from_slice(&values)
    }

    /// The parameters as eleven ordered scalars.
    pub fn to_array(&self) -> [f64; PARAMETER_COUNT] {
        [
            self.t0,
            self.t1,
            self.dt,
            self.q0,
            self.p0,
            self.resistance,
            self.inductance,
            self.capacitance,
            self.source_voltage,
            self.source_frequency,
            self.source_phase,
        ]
    }

    /// Build the circuit described by these parameters.
    pub fn circuit(&self) -> Circuit {
        Circuit::new(self.resistance, self.inductance, self.capacitance).with_source(
            SineSource::new(self.source_voltage, self.source_frequency, self.source_phase),
        )
    }

    /// Build the circuit, then a simulation of it.
    pub fn build(&self) -> Result<Simulation> {
        Simulation::new(self.circuit(), self.t0, self.t1, self.q0, self.p0, self.dt)
    }
}
