use log::info;

use crate::caf::{check_alpha, cyclic_autocorrelation, CafSequence};
use crate::dominant::dominant_frequency;
use crate::error::{AnalysisError, Result};
use crate::grid::nearest_alpha_index;
use crate::profile::{cyclic_profile, AlphaSpan, CyclicProfile, ProfileParams};
use crate::scf::{spectral_correlation, ScfOptions, ScfScaling, ScfSlice};
use crate::signal::Signal;
use crate::spectrum::{compute_spectrum, Spectrum};
use crate::surface::{scf_surface, ScfSurface, SurfaceParams};
use crate::{DEFAULT_ALPHA, DEFAULT_MAX_LAG, DEFAULT_N_ALPHA, DEFAULT_N_FREQ};

/// Parameter set for one full recomputation of every view
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Cyclic frequency for the CAF and SCF slice, Hz
    pub alpha: f64,
    pub max_lag: usize,
    pub n_alpha: usize,
    pub n_freq: usize,
    pub scaling: ScfScaling,
    pub profile_span: AlphaSpan,
    /// Center-shift the SCF slice
    pub centered: bool,
    /// Also build the alpha x frequency surface
    pub surface: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_lag: DEFAULT_MAX_LAG,
            n_alpha: DEFAULT_N_ALPHA,
            n_freq: DEFAULT_N_FREQ,
            scaling: ScfScaling::default(),
            profile_span: AlphaSpan::default(),
            centered: true,
            surface: false,
        }
    }
}

impl AnalysisConfig {
    /// Check everything that does not depend on the signal
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        if self.n_alpha == 0 {
            return Err(AnalysisError::InvalidGridSize {
                name: "n_alpha",
                value: self.n_alpha,
            });
        }
        if self.n_freq == 0 {
            return Err(AnalysisError::InvalidGridSize {
                name: "n_freq",
                value: self.n_freq,
            });
        }
        Ok(())
    }
}

/// Every derived view of one signal for one parameter set
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    pub sample_rate: f64,
    pub spectrum: Spectrum,
    pub dominant_frequency: f64,
    pub caf: CafSequence,
    pub scf: ScfSlice,
    pub profile: CyclicProfile,
    /// Profile grid index nearest the configured alpha
    pub alpha_index: usize,
    pub surface: Option<ScfSurface>,
}

/// Run spectrum -> dominant frequency -> CAF -> SCF -> profile (-> surface)
///
/// All preconditions are checked before any stage runs, so a failure never
/// leaves a partially computed result behind.
///
/// # Errors
///
/// Any precondition violation from the individual stages.
pub fn analyze(signal: &Signal, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;
    signal.check_max_lag(config.max_lag)?;
    if signal.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            needed: 2,
            got: signal.len(),
        });
    }

    info!(
        "analyzing {} samples at {} Hz (alpha={} Hz, max_lag={}, n_alpha={}, n_freq={})",
        signal.len(),
        signal.sample_rate(),
        config.alpha,
        config.max_lag,
        config.n_alpha,
        config.n_freq
    );

    let spectrum = compute_spectrum(signal)?;
    let f0 = dominant_frequency(signal)?;

    let caf = cyclic_autocorrelation(signal, config.alpha, config.max_lag)?;
    let scf_options = ScfOptions {
        n_freq: None,
        centered: config.centered,
        scaling: config.scaling,
    };
    let scf = spectral_correlation(&caf, signal.sample_rate(), scf_options)?;

    let profile = cyclic_profile(
        signal,
        &ProfileParams {
            max_lag: config.max_lag,
            n_alpha: config.n_alpha,
            n_freq: config.n_freq,
            target_frequency: f0,
            span: config.profile_span,
            scaling: config.scaling,
        },
    )?;
    let alpha_index = nearest_alpha_index(&profile.alphas, config.alpha).unwrap_or(0);

    let surface = if config.surface {
        Some(scf_surface(
            signal,
            &SurfaceParams {
                max_lag: config.max_lag,
                n_alpha: config.n_alpha,
                n_freq: config.n_freq,
                scaling: config.scaling,
            },
        )?)
    } else {
        None
    };

    Ok(Analysis {
        sample_rate: signal.sample_rate(),
        spectrum,
        dominant_frequency: f0,
        caf,
        scf,
        profile,
        alpha_index,
        surface,
    })
}
