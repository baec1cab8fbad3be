mod error;
mod server;
mod signal_io;
mod worker;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cycloscope_core::{
    analyze, compute_spectrum, cyclic_autocorrelation, cyclic_profile, dominant_bin,
    dominant_frequency, nearest_alpha_index, scf_surface, spectral_correlation, AlphaSpan,
    AnalysisConfig, CyclicProfile, ProfileParams, ScfOptions, ScfScaling, SurfaceParams,
    DEFAULT_ALPHA, DEFAULT_MAX_LAG, DEFAULT_N_ALPHA, DEFAULT_N_FREQ,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::signal_io::{load_signal, write_json};

#[derive(Parser)]
#[command(name = "cycloscope")]
#[command(about = "Cyclostationary signal analysis: spectrum, CAF, SCF and cyclic profiles")]
struct Cli {
    /// Write JSON results to this file instead of stdout
    #[arg(short, long, global = true, value_name = "OUTPUT.JSON")]
    output: Option<PathBuf>,

    /// Pretty-print JSON results
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input signal: a WAV file or a JSON array of samples
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Sample rate in Hz (required for JSON input, overrides the WAV header)
    #[arg(short = 'r', long)]
    sample_rate: Option<f64>,
}

#[derive(Args)]
struct GridArgs {
    /// Maximum lag in samples
    #[arg(short = 'l', long, default_value_t = DEFAULT_MAX_LAG)]
    max_lag: usize,

    /// Number of cyclic frequencies in the alpha grid
    #[arg(long, default_value_t = DEFAULT_N_ALPHA)]
    n_alpha: usize,

    /// SCF transform length for the profile and surface
    #[arg(long, default_value_t = DEFAULT_N_FREQ)]
    n_freq: usize,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum ScalingArg {
    /// Raw DFT magnitudes
    #[default]
    Unnormalized,
    /// Divide by the transform length
    ByLength,
}

impl From<ScalingArg> for ScfScaling {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::Unnormalized => ScfScaling::Unnormalized,
            ScalingArg::ByLength => ScfScaling::ByTransformLength,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum SpanArg {
    /// Sweep alpha over [0, fs/4]
    #[default]
    Quarter,
    /// Sweep alpha over [0, fs/2]
    Half,
}

impl From<SpanArg> for AlphaSpan {
    fn from(arg: SpanArg) -> Self {
        match arg {
            SpanArg::Quarter => AlphaSpan::QuarterRate,
            SpanArg::Half => AlphaSpan::HalfRate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Magnitude and phase spectrum
    Spectrum {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Dominant (non-DC) frequency, rounded to 0.1 Hz
    Dominant {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Cyclic autocorrelation at one cyclic frequency
    Caf {
        #[command(flatten)]
        input: InputArgs,

        /// Cyclic frequency in Hz
        #[arg(short, long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,

        /// Maximum lag in samples
        #[arg(short = 'l', long, default_value_t = DEFAULT_MAX_LAG)]
        max_lag: usize,
    },

    /// Spectral correlation slice at one cyclic frequency
    Scf {
        #[command(flatten)]
        input: InputArgs,

        /// Cyclic frequency in Hz
        #[arg(short, long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,

        /// Maximum lag in samples
        #[arg(short = 'l', long, default_value_t = DEFAULT_MAX_LAG)]
        max_lag: usize,

        /// Transform length (default: number of lags)
        #[arg(long)]
        n_freq: Option<usize>,

        /// Keep FFT bin order instead of centering 0 Hz
        #[arg(long)]
        uncentered: bool,

        #[arg(long, value_enum, default_value_t)]
        scaling: ScalingArg,
    },

    /// |S(f0, alpha)| over a grid of cyclic frequencies
    Profile {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        grid: GridArgs,

        /// Target frequency f0 in Hz (default: the dominant frequency)
        #[arg(short, long)]
        target: Option<f64>,

        /// Also report the grid index nearest this cyclic frequency
        #[arg(short, long)]
        alpha: Option<f64>,

        #[arg(long, value_enum, default_value_t)]
        alpha_span: SpanArg,

        #[arg(long, value_enum, default_value_t)]
        scaling: ScalingArg,
    },

    /// |S(f, alpha)| surface with dB display bounds
    Surface {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        grid: GridArgs,

        #[arg(long, value_enum, default_value_t)]
        scaling: ScalingArg,
    },

    /// Every view for one parameter set
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        grid: GridArgs,

        /// Cyclic frequency in Hz
        #[arg(short, long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,

        #[arg(long, value_enum, default_value_t)]
        alpha_span: SpanArg,

        #[arg(long, value_enum, default_value_t)]
        scaling: ScalingArg,

        /// Keep FFT bin order in the SCF slice
        #[arg(long)]
        uncentered: bool,

        /// Include the alpha x frequency surface
        #[arg(long)]
        surface: bool,
    },

    /// Serve the analysis engine over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[derive(Serialize)]
struct DominantReport {
    frequency: f64,
    bin: usize,
}

#[derive(Serialize)]
struct ProfileReport {
    profile: CyclicProfile,
    alpha_index: Option<usize>,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only JSON; `RUST_LOG` overrides the level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let output = cli.output.as_deref();
    let pretty = cli.pretty;

    match cli.command {
        Commands::Spectrum { input } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let spectrum = compute_spectrum(&loaded.signal()?)?;
            write_json(&spectrum, output, pretty)
        }
        Commands::Dominant { input } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let signal = loaded.signal()?;
            let report = DominantReport {
                frequency: dominant_frequency(&signal)?,
                bin: dominant_bin(&signal)?,
            };
            write_json(&report, output, pretty)
        }
        Commands::Caf { input, alpha, max_lag } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let caf = cyclic_autocorrelation(&loaded.signal()?, alpha, max_lag)?;
            write_json(&caf, output, pretty)
        }
        Commands::Scf {
            input,
            alpha,
            max_lag,
            n_freq,
            uncentered,
            scaling,
        } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let caf = cyclic_autocorrelation(&loaded.signal()?, alpha, max_lag)?;
            let options = ScfOptions {
                n_freq,
                centered: !uncentered,
                scaling: scaling.into(),
            };
            let slice = spectral_correlation(&caf, loaded.sample_rate, options)?;
            write_json(&slice, output, pretty)
        }
        Commands::Profile {
            input,
            grid,
            target,
            alpha,
            alpha_span,
            scaling,
        } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let signal = loaded.signal()?;
            let target_frequency = match target {
                Some(f0) => f0,
                None => dominant_frequency(&signal)?,
            };
            let params = ProfileParams {
                max_lag: grid.max_lag,
                n_alpha: grid.n_alpha,
                n_freq: grid.n_freq,
                target_frequency,
                span: alpha_span.into(),
                scaling: scaling.into(),
            };
            let profile = cyclic_profile(&signal, &params)?;
            let alpha_index = alpha.and_then(|a| nearest_alpha_index(&profile.alphas, a));
            write_json(&ProfileReport { profile, alpha_index }, output, pretty)
        }
        Commands::Surface {
            input,
            grid,
            scaling,
        } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let params = SurfaceParams {
                max_lag: grid.max_lag,
                n_alpha: grid.n_alpha,
                n_freq: grid.n_freq,
                scaling: scaling.into(),
            };
            let surface = scf_surface(&loaded.signal()?, &params)?;
            write_json(&surface, output, pretty)
        }
        Commands::Report {
            input,
            grid,
            alpha,
            alpha_span,
            scaling,
            uncentered,
            surface,
        } => {
            let loaded = load_signal(&input.input, input.sample_rate)?;
            let config = AnalysisConfig {
                alpha,
                max_lag: grid.max_lag,
                n_alpha: grid.n_alpha,
                n_freq: grid.n_freq,
                scaling: scaling.into(),
                profile_span: alpha_span.into(),
                centered: !uncentered,
                surface,
            };
            let analysis = analyze(&loaded.signal()?, &config)?;
            write_json(&analysis, output, pretty)
        }
        Commands::Serve { addr } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(addr))
        }
    }
}
