//! Cyclostationary analysis engine
//!
//! Estimates second-order cyclostationary structure of a real-valued signal:
//! the ordinary magnitude spectrum, the cyclic autocorrelation function (CAF)
//! at a chosen cyclic frequency, the spectral correlation function (SCF)
//! obtained by transforming the CAF over lag, a cyclic-domain profile
//! |S(f0, alpha)| and the full |S(f, alpha)| surface.
//!
//! Every operation is a pure function of a borrowed [`Signal`] and a handful
//! of numeric parameters. Nothing is cached across calls except the FFT
//! planner, which is kept per thread.

pub mod error;
pub mod signal;
pub mod dft;
pub mod spectrum;
pub mod dominant;
pub mod caf;
pub mod scf;
pub mod grid;
pub mod profile;
pub mod surface;
pub mod analysis;
pub mod input;

pub use analysis::{analyze, Analysis, AnalysisConfig};
pub use caf::{cyclic_autocorrelation, CafSequence};
pub use dominant::{dominant_bin, dominant_frequency};
pub use error::{AnalysisError, Result};
pub use grid::{alpha_grid, nearest_alpha_index};
pub use profile::{cyclic_profile, AlphaSpan, CyclicProfile, ProfileParams};
pub use scf::{spectral_correlation, ScfOptions, ScfScaling, ScfSlice};
pub use signal::Signal;
pub use spectrum::{compute_spectrum, Spectrum};
pub use surface::{scf_surface, DisplayBounds, ScfSurface, SurfaceParams};

// Analysis defaults (match the interactive explorer's initial state)
pub const DEFAULT_ALPHA: f64 = 2.0; // Hz
pub const DEFAULT_MAX_LAG: usize = 100; // samples
pub const DEFAULT_N_ALPHA: usize = 32;
pub const DEFAULT_N_FREQ: usize = 64;

// Surface configuration
pub const LOG_EPSILON: f64 = 1e-12;
pub const LOWER_DISPLAY_PERCENTILE: f64 = 0.05;
pub const UPPER_DISPLAY_PERCENTILE: f64 = 0.95;

/// Dominant frequency is reported on a 0.1 Hz grid
pub const DOMINANT_FREQUENCY_STEP: f64 = 0.1;
