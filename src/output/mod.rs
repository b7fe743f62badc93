//! Result export.
//!
//! Writes simulation series as CSV and picks how densely to sample them
//! for display.

use std::io::{BufWriter, Write};

use crate::error::{RlcError, Result};
use crate::solver::{Channel, SimulationResults};

/// Series at or below this length are always shown in full.
pub const FULL_RESOLUTION_LIMIT: usize = 1000;

/// Default number of points to keep when downsampling for display.
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Sampling offset for showing a series of `len` points.
///
/// Series up to [`FULL_RESOLUTION_LIMIT`] keep every point. Longer ones keep at most `max_points`
/// points; the offset is never below 1.
pub fn display_offset(len: usize, max_points: usize) -> usize {
    if len <= FULL_RESOLUTION_LIMIT {
        return 1;
    }
    len.div_ceil(max_points.max(1)).max(1)
}

/// CSV writer for simulation results.
pub struct CsvWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> CsvWriter<W> {
    /// Create a new CSV writer.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Write the header row followed by one row per sample.
    pub fn write_results(&mut self, results: &SimulationResults<'_>) -> Result<()> {
        let mut header = String::from("time");
        for channel in Channel::ALL {
            header.push(',');
            header.push_str(channel.key());
        }
        writeln!(self.out, "{header}").map_err(output_error)?;

        let channels = results.channels();
        for (i, t) in results.time.iter().enumerate() {
            write!(self.out, "{t}").map_err(output_error)?;
            for (_, series) in &channels {
                write!(self.out, ",{}", series[i]).map_err(output_error)?;
            }
            writeln!(self.out).map_err(output_error)?;
        }

        Ok(())
    }

    /// Flush buffered rows.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(output_error)
    }
}

fn output_error(err: std::io::Error) -> RlcError {
    RlcError::output(err.to_string())
}
