//! Result series of a simulation, optionally downsampled.

use std::borrow::Cow;
use std::fmt;

use super::Simulation;

/// One of the five series produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Charge,
    Current,
    ResistorVoltage,
    InductorVoltage,
    CapacitorVoltage,
}

impl Channel {
    /// All channels, in reporting order.
    pub const ALL: [Channel; 5] = [
        Channel::Charge,
        Channel::Current,
        Channel::ResistorVoltage,
        Channel::InductorVoltage,
        Channel::CapacitorVoltage,
    ];

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Channel::Charge => "Charge",
            Channel::Current => "Current",
            Channel::ResistorVoltage => "Resistor Voltage",
            Channel::InductorVoltage => "Inductor Voltage",
            Channel::CapacitorVoltage => "Capacitor Voltage",
        }
    }

    /// SI unit symbol.
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Charge => "C",
            Channel::Current => "A",
            _ => "V",
        }
    }

    /// Machine-friendly column name.
    pub fn key(&self) -> &'static str {
        match self {
            Channel::Charge => "charge",
            Channel::Current => "current",
            Channel::ResistorVoltage => "resistor_voltage",
            Channel::InductorVoltage => "inductor_voltage",
            Channel::CapacitorVoltage => "capacitor_voltage",
        }
    }

    /// Look up a channel by its position in [`Channel::ALL`].
    pub fn from_index(index: usize) -> Option<Channel> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title(), self.unit())
    }
}

/// Time grid and series returned by [`Simulation::results`].
///
/// Full-resolution results borrow the simulation's storage; downsampled
/// results own their copies.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults<'a> {
    pub time: Cow<'a, [f64]>,
    pub charge: Cow<'a, [f64]>,
    pub current: Cow<'a, [f64]>,
    pub resistor_voltage: Cow<'a, [f64]>,
    pub inductor_voltage: Cow<'a, [f64]>,
    pub capacitor_voltage: Cow<'a, [f64]>,
}

impl<'a> SimulationResults<'a> {
    pub(super) fn borrowed(sim: &'a Simulation) -> Self {
        Self {
            time: Cow::Borrowed(sim.time()),
            charge: Cow::Borrowed(sim.charge()),
            current: Cow::Borrowed(sim.current()),
            resistor_voltage: Cow::Borrowed(sim.resistor_voltage()),
            inductor_voltage: Cow::Borrowed(sim.inductor_voltage()),
            capacitor_voltage: Cow::Borrowed(sim.capacitor_voltage()),
        }
    }

    pub(super) fn sampled(sim: &Simulation, offset: usize) -> Self {
        let every = |series: &[f64]| -> Cow<'a, [f64]> {
            Cow::Owned(series.iter().step_by(offset).copied().collect())
        };

        Self {
            time: every(sim.time()),
            charge: every(sim.charge()),
            current: every(sim.current()),
            resistor_voltage: every(sim.resistor_voltage()),
            inductor_voltage: every(sim.inductor_voltage()),
            capacitor_voltage: every(sim.capacitor_voltage()),
        }
    }

    /// Number of points in each series.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Get one series.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Charge => &self.charge,
            Channel::Current => &self.current,
            Channel::ResistorVoltage => &self.resistor_voltage,
            Channel::InductorVoltage => &self.inductor_voltage,
            Channel::CapacitorVoltage => &self.capacitor_voltage,
        }
    }

    /// All series paired with their channel, in [`Channel::ALL`] order.
    pub fn channels(&self) -> [(Channel, &[f64]); 5] {
        Channel::ALL.map(|channel| (channel, self.channel(channel)))
    }
}
