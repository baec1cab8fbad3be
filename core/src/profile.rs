//! Cyclic-domain profile |S_x(f0, alpha)| vs alpha
//!
//! Sweeps the cyclic frequency over a grid, runs CAF -> SCF for each point and
//! samples the SCF at the bin nearest a fixed spectral frequency (normally the
//! signal's dominant frequency). Peaks in the profile mark the cyclic
//! frequencies where the signal is cyclostationary; a stationary signal only
//! shows energy at alpha = 0.

use log::{debug, trace};

use crate::caf::cyclic_autocorrelation;
use crate::error::{AnalysisError, Result};
use crate::grid::{alpha_grid, map_grid};
use crate::scf::{spectral_correlation, ScfOptions, ScfScaling};
use crate::signal::Signal;
use crate::{DEFAULT_MAX_LAG, DEFAULT_N_ALPHA, DEFAULT_N_FREQ};

/// Upper end of the alpha sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlphaSpan {
    /// `[0, sample_rate / 4]`
    #[default]
    QuarterRate,
    /// `[0, sample_rate / 2]`
    HalfRate,
}

impl AlphaSpan {
    pub fn max_alpha(self, sample_rate: f64) -> f64 {
        match self {
            AlphaSpan::QuarterRate => sample_rate / 4.0,
            AlphaSpan::HalfRate => sample_rate / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileParams {
    pub max_lag: usize,
    pub n_alpha: usize,
    /// SCF transform length
    pub n_freq: usize,
    /// Spectral frequency f0 in Hz at which the SCF is sampled
    pub target_frequency: f64,
    pub span: AlphaSpan,
    pub scaling: ScfScaling,
}

impl ProfileParams {
    pub fn new(target_frequency: f64) -> Self {
        Self {
            max_lag: DEFAULT_MAX_LAG,
            n_alpha: DEFAULT_N_ALPHA,
            n_freq: DEFAULT_N_FREQ,
            target_frequency,
            span: AlphaSpan::default(),
            scaling: ScfScaling::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CyclicProfile {
    pub target_frequency: f64,
    /// Natural-order SCF bin the profile was sampled at
    pub bin: usize,
    pub alphas: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl CyclicProfile {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Natural-order bin of a length-`n_freq` SCF nearest `frequency`
///
/// Bins past `n_freq / 2` are folded back onto their positive-frequency
/// mirror; the SCF magnitude of a real CAF is symmetric, so both hold the same value.
pub fn target_bin(frequency: f64, sample_rate: f64, n_freq: usize) -> usize {
    let resolution = sample_rate / n_freq as f64;
    let bin = (frequency.abs() / resolution).round() as usize % n_freq;
    if (bin as f64) < n_freq as f64 / 2.0 {
        bin
    } else {
        n_freq - bin
    }
}

/// Build the cyclic-domain profile of `signal` at `params.target_frequency`
///
/// # Errors
///
/// - `AnalysisError::InvalidGridSize` if `n_alpha` or `n_freq` is zero
/// - `AnalysisError::InvalidFrequency` if the target frequency is not finite
/// - `AnalysisError::InvalidMaxLag` if `max_lag >= signal.len()`
pub fn cyclic_profile(signal: &Signal, params: &ProfileParams) -> Result<CyclicProfile> {
    if params.n_freq == 0 {
        return Err(AnalysisError::InvalidGridSize {
            name: "n_freq",
            value: params.n_freq,
        });
    }
    if !params.target_frequency.is_finite() {
        return Err(AnalysisError::InvalidFrequency(params.target_frequency));
    }
    signal.check_max_lag(params.max_lag)?;

    let sample_rate = signal.sample_rate();
    let alphas = alpha_grid(params.n_alpha, params.span.max_alpha(sample_rate))?;
    let bin = target_bin(params.target_frequency, sample_rate, params.n_freq);

    debug!(
        "profile: f0={} Hz (bin {} of {}), {} alphas over {:?}, max_lag={}",
        params.target_frequency,
        bin,
        params.n_freq,
        params.n_alpha,
        params.span,
        params.max_lag
    );

    let options = ScfOptions::default()
        .with_n_freq(params.n_freq)
        .with_scaling(params.scaling);

    let magnitudes = map_grid(&alphas, |alpha| {
        let caf = cyclic_autocorrelation(signal, alpha, params.max_lag)?;
        let scf = spectral_correlation(&caf, sample_rate, options)?;
        trace!("profile alpha {} Hz: |S| = {}", alpha, scf.magnitudes[bin]);
        Ok(scf.magnitudes[bin])
    })?;

    Ok(CyclicProfile {
        target_frequency: params.target_frequency,
        bin,
        alphas,
        magnitudes,
    })
}
