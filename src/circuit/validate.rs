//! Circuit validation.

use crate::error::{RlcError, Result};

use super::Circuit;

/// Validate circuit values before simulating them.
///
/// Checks:
/// - All values are finite
/// - Inductance and capacitance are strictly positive
/// - Resistance is not negative (zero gives an ideal LC oscillator)
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    let values = [
        ("resistance", circuit.resistance),
        ("inductance", circuit.inductance),
        ("capacitance", circuit.capacitance),
        ("source amplitude", circuit.source.amplitude),
        ("source frequency", circuit.source.frequency),
        ("source phase", circuit.source.phase),
    ];

    if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
        return Err(RlcError::invalid_circuit(format!(
            "{name} must be finite (got {value})"
        )));
    }

    if circuit.inductance <= 0.0 {
        return Err(RlcError::invalid_circuit(format!(
            "inductance must be positive (got {})",
            circuit.inductance
        )));
    }

    if circuit.capacitance <= 0.0 {
        return Err(RlcError::invalid_circuit(format!(
            "capacitance must be positive (got {})",
            circuit.capacitance
        )));
    }

    if circuit.resistance < 0.0 {
        return Err(RlcError::invalid_circuit(format!(
            "resistance cannot be negative (got {})",
            circuit.resistance
        )));
    }

    Ok(())
}
