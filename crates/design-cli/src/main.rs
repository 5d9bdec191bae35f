//! targetfit: filter design from a target frequency.
//!
//! Resolves Butterworth cutoffs (analog or IIR) or searches windowed FIR
//! cutoffs so that a target frequency lands in the requested band.

mod config;
mod orchestrator;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::{DesignMethod, DesignRequest, SearchArgs};
use lib_filter::{SearchConfig, SelectionStrategy, WindowType};
use lib_types::{Band, FilterKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "targetfit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    /// C header with coefficient tables
    C,
}

/// Target shared by every design subcommand.
#[derive(Args, Clone, Debug)]
struct TargetArgs {
    /// Target frequency (Hz)
    #[arg(short, long)]
    target: f64,

    /// Filter order (tap count for FIR)
    #[arg(short = 'n', long)]
    order: usize,

    /// lowpass or highpass
    #[arg(short, long, default_value = "lowpass")]
    kind: FilterKind,

    /// Allowed magnitude deviation
    #[arg(short, long, default_value = "0.05")]
    deviation: f64,

    /// Band the target must land in (pass or stop)
    #[arg(short, long, default_value = "pass")]
    band: Band,
}

impl TargetArgs {
    fn request(&self, name: &str, method: DesignMethod) -> DesignRequest {
        let mut request = DesignRequest::new(name, method, self.target, self.order);
        request.kind = self.kind;
        request.deviation = self.deviation;
        request.band = self.band;
        request
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Closed-form analog Butterworth cutoff
    Analog {
        #[command(flatten)]
        target: TargetArgs,

        /// Size a Sallen-Key stage around this resistor (ohm)
        #[arg(long)]
        resistance: Option<f64>,

        /// Write the magnitude curve to this CSV file
        #[arg(long)]
        response: Option<PathBuf>,

        /// Points in the magnitude curve
        #[arg(long, default_value = "1000")]
        points: usize,
    },

    /// Windowed FIR via cutoff search
    Fir {
        #[command(flatten)]
        target: TargetArgs,

        /// Sample rate (Hz)
        #[arg(short, long)]
        sample_rate: f64,

        /// Candidate selection strategy (closest or threshold)
        #[arg(long, default_value = "closest")]
        strategy: SelectionStrategy,

        /// Candidate cutoffs to try
        #[arg(long, default_value = "10000")]
        candidates: usize,

        /// Frequency grid points per candidate
        #[arg(long, default_value = "4096")]
        grid_points: usize,

        /// Taper window (hamming, hann, blackman, rectangular, kaiser:<beta>)
        #[arg(long, default_value = "hamming")]
        window: WindowType,

        /// Evaluate candidates on all cores
        #[arg(long)]
        parallel: bool,

        /// Stop after this many candidate evaluations
        #[arg(long)]
        max_evaluations: Option<usize>,

        /// Fail instead of reporting a degraded result
        #[arg(long)]
        strict: bool,

        /// Write the magnitude response to this CSV file
        #[arg(long)]
        response: Option<PathBuf>,
    },

    /// Digital Butterworth through the analog cutoff
    Iir {
        #[command(flatten)]
        target: TargetArgs,

        /// Sample rate (Hz)
        #[arg(short, long)]
        sample_rate: f64,

        /// Response grid points
        #[arg(long, default_value = "512")]
        grid_points: usize,

        /// Write the magnitude response to this CSV file
        #[arg(long)]
        response: Option<PathBuf>,
    },

    /// Run every design in a request file
    Design {
        /// Path to the TOML or JSON request file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Fail if any design is degraded
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Analog { target, resistance, response, points } => {
            design_analog(&target, resistance, response.as_deref(), points, cli.format)?;
        }
        Commands::Fir {
            target,
            sample_rate,
            strategy,
            candidates,
            grid_points,
            window,
            parallel,
            max_evaluations,
            strict,
            response,
        } => {
            let search = SearchArgs {
                strategy,
                candidates,
                grid_points,
                window,
                parallel,
                max_evaluations,
            };
            design_fir(
                &target,
                sample_rate,
                search.into(),
                strict,
                response.as_deref(),
                cli.format,
            )?;
        }
        Commands::Iir { target, sample_rate, grid_points, response } => {
            design_iir(&target, sample_rate, grid_points, response.as_deref(), cli.format)?;
        }
        Commands::Design { config, output, strict } => {
            run_designs(&config, &output, strict, cli.format)?;
        }
    }

    Ok(())
}

fn design_analog(
    target: &TargetArgs,
    resistance: Option<f64>,
    response: Option<&Path>,
    points: usize,
    format: OutputFormat,
) -> Result<()> {
    let mut request = target.request("analog", DesignMethod::Analog);
    request.resistance_ohm = resistance;
    request.response_points = points;

    let outcome = orchestrator::run_request(&request, &SearchConfig::default())?;
    output::print_outcome(&outcome, format)?;
    if let Some(path) = response {
        output::write_response(&outcome.response, path)?;
    }

    Ok(())
}

fn design_fir(
    target: &TargetArgs,
    sample_rate: f64,
    search: SearchConfig,
    strict: bool,
    response: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut request = target.request("fir", DesignMethod::Fir);
    request.sample_rate_hz = Some(sample_rate);

    let outcome = orchestrator::run_request(&request, &search)?;
    output::print_outcome(&outcome, format)?;
    if let Some(path) = response {
        output::write_response(&outcome.response, path)?;
    }
    if strict {
        outcome.require_met()?;
    }

    Ok(())
}

fn design_iir(
    target: &TargetArgs,
    sample_rate: f64,
    grid_points: usize,
    response: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut request = target.request("iir", DesignMethod::Iir);
    request.sample_rate_hz = Some(sample_rate);
    request.response_points = grid_points;

    let outcome = orchestrator::run_request(&request, &SearchConfig::default())?;
    output::print_outcome(&outcome, format)?;
    if let Some(path) = response {
        output::write_response(&outcome.response, path)?;
    }

    Ok(())
}

fn run_designs(
    config_path: &Path,
    output_dir: &Path,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let orchestrator = orchestrator::Orchestrator::new(config)?;
    let outcomes = orchestrator.run()?;

    std::fs::create_dir_all(output_dir)?;
    output::write_results(&outcomes, output_dir, format)?;

    println!("Results written to {:?}", output_dir);

    if strict {
        for outcome in &outcomes {
            outcome.require_met()?;
        }
    }

    Ok(())
}
