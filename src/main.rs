//! RLC - Series RLC Circuit Simulator
//!
//! Integrates the transient response of a series RLC circuit and writes the
//! charge, current and element voltages as CSV.
//!
//! # Usage
//!
//! ```bash
//! rlc --t1 0.05 --dt 1e-6 --resistance 10 --inductance 1e-3 --capacitance 1e-6 > rlc.csv
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use rlc_sim::{
    circuit::validate_circuit,
    error::{Result, RlcError},
    output::{display_offset, CsvWriter, DEFAULT_MAX_POINTS},
    solver::{runner, SimulationListener},
    Simulation, SimulationParams,
};

/// Series RLC circuit transient simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Start time in seconds
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    t0: f64,

    /// End time in seconds (excluded)
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    t1: f64,

    /// Time step in seconds
    #[arg(long, default_value_t = 1e-3, allow_negative_numbers = true)]
    dt: f64,

    /// Initial capacitor charge in coulombs
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    q0: f64,

    /// Initial loop current in amperes
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    p0: f64,

    /// Resistance in ohms
    #[arg(short = 'R', long, default_value_t = 1.0)]
    resistance: f64,

    /// Inductance in henries
    #[arg(short = 'L', long, default_value_t = 1.0)]
    inductance: f64,

    /// Capacitance in farads
    #[arg(short = 'C', long, default_value_t = 1.0)]
    capacitance: f64,

    /// Source peak voltage in volts
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    emf: f64,

    /// Source frequency in hertz
    #[arg(long, default_value_t = 0.0)]
    frequency: f64,

    /// Source phase
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    phase: f64,

    /// Maximum number of rows to write; long runs are downsampled to fit
    #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
    max_points: usize,

    /// Write CSV to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print progress to stderr
    #[arg(long)]
    progress: bool,
}

impl Args {
    fn params(&self) -> SimulationParams {
        SimulationParams {
            t0: self.t0,
            t1: self.t1,
            dt: self.dt,
            q0: self.q0,
            p0: self.p0,
            resistance: self.resistance,
            inductance: self.inductance,
            capacitance: self.capacitance,
            source_voltage: self.emf,
            source_frequency: self.frequency,
            source_phase: self.phase,
        }
    }
}

/// Collects the finished run and renders progress.
struct CliListener {
    show_progress: bool,
    finished: Option<Simulation>,
}

impl SimulationListener for CliListener {
    fn on_progress(&mut self, percent: u8) {
        if self.show_progress {
            eprint!("\r{percent:>3}%");
            if percent == 100 {
                eprintln!();
            }
        }
    }

    fn on_complete(&mut self, simulation: Simulation) {
        self.finished = Some(simulation);
    }

    fn on_cancelled(&mut self, _simulation: Simulation) {
        warn!("Simulation cancelled; discarding partial results");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let params = args.params();

    // Validate
    let circuit = params.circuit();
    validate_circuit(&circuit)?;
    info!(
        "Natural frequency {:.4e} rad/s, damping ratio {:.4}",
        circuit.natural_frequency(),
        circuit.damping_ratio()
    );

    // Run on a worker thread
    let simulation = params.build()?;
    let handle = runner::spawn(simulation)?;
    let mut listener = CliListener {
        show_progress: args.progress,
        finished: None,
    };
    handle.wait(&mut listener)?;

    let simulation = listener.finished.ok_or(RlcError::Cancelled)?;
    let offset = display_offset(simulation.len(), args.max_points);
    let results = simulation.results(offset as isize)?;
    info!("Writing {} of {} samples", results.len(), simulation.len());

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).map_err(|e| {
            RlcError::output(format!("cannot create '{}': {e}", path.display()))
        })?),
        None => Box::new(io::stdout().lock()),
    };

    let mut writer = CsvWriter::new(out);
    writer.write_results(&results)?;
    writer.flush()?;

    Ok(())
}
