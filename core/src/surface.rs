use log::debug;

use crate::caf::cyclic_autocorrelation;
use crate::dft::centered_frequencies;
use crate::error::{AnalysisError, Result};
use crate::grid::{alpha_grid, map_grid};
use crate::scf::{spectral_correlation, ScfOptions, ScfScaling};
use crate::signal::Signal;
use crate::{
    DEFAULT_MAX_LAG, DEFAULT_N_ALPHA, DEFAULT_N_FREQ, LOG_EPSILON, LOWER_DISPLAY_PERCENTILE,
    UPPER_DISPLAY_PERCENTILE,
};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceParams {
    pub max_lag: usize,
    pub n_alpha: usize,
    pub n_freq: usize,
    pub scaling: ScfScaling,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            max_lag: DEFAULT_MAX_LAG,
            n_alpha: DEFAULT_N_ALPHA,
            n_freq: DEFAULT_N_FREQ,
            scaling: ScfScaling::default(),
        }
    }
}

/// Color-scale limits for the dB surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayBounds {
    pub zmin: f64,
    pub zmax: f64,
}

/// |S_x(f, alpha)| over an alpha x frequency grid
///
/// Rows are indexed by alpha, columns by centered frequency.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScfSurface {
    pub alphas: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub magnitude: Vec<Vec<f64>>,
    /// `10 * log10(magnitude + LOG_EPSILON)`
    pub log_magnitude: Vec<Vec<f64>>,
    pub bounds: DisplayBounds,
}

impl ScfSurface {
    /// (rows, columns) = (alphas, frequencies)
    pub fn shape(&self) -> (usize, usize) {
        (self.alphas.len(), self.frequencies.len())
    }
}

/// dB transform with an epsilon floor, so zero magnitude maps to -120 dB instead of -inf
pub fn to_db(magnitude: f64) -> f64 {
    10.0 * (magnitude + LOG_EPSILON).log10()
}

/// Nearest-rank percentile: sort ascending, take index `floor(p * (count - 1))`
///
/// Returns `None` for an empty input. NaNs sort after every number.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    Some(sorted[index])
}

/// 5th/95th percentile bounds of a dB grid
pub fn display_bounds(log_magnitude: &[Vec<f64>]) -> Option<DisplayBounds> {
    let flat: Vec<f64> = log_magnitude.iter().flatten().copied().collect();
    Some(DisplayBounds {
        zmin: percentile(&flat, LOWER_DISPLAY_PERCENTILE)?,
        zmax: percentile(&flat, UPPER_DISPLAY_PERCENTILE)?,
    })
}

/// Build the full spectral correlation surface over alpha in `[0, sample_rate / 2]`
///
/// # Errors
///
/// - `AnalysisError::InvalidGridSize` if `n_alpha` or `n_freq` is zero
/// - `AnalysisError::InvalidMaxLag` if `max_lag >= signal.len()`
pub fn scf_surface(signal: &Signal, params: &SurfaceParams) -> Result<ScfSurface> {
    if params.n_freq == 0 {
        return Err(AnalysisError::InvalidGridSize {
            name: "n_freq",
            value: params.n_freq,
        });
    }
    signal.check_max_lag(params.max_lag)?;

    let sample_rate = signal.sample_rate();
    let alphas = alpha_grid(params.n_alpha, sample_rate / 2.0)?;

    debug!(
        "surface: {} alphas x {} frequencies, max_lag={}",
        params.n_alpha, params.n_freq, params.max_lag
    );

    let options = ScfOptions::centered()
        .with_n_freq(params.n_freq)
        .with_scaling(params.scaling);

    let magnitude = map_grid(&alphas, |alpha| {
        let caf = cyclic_autocorrelation(signal, alpha, params.max_lag)?;
        Ok(spectral_correlation(&caf, sample_rate, options)?.magnitudes)
    })?;

    let log_magnitude: Vec<Vec<f64>> = magnitude
        .iter()
        .map(|row| row.iter().map(|&m| to_db(m)).collect())
        .collect();

    // Grid sizes were checked above, so the grid is never empty
    let bounds = display_bounds(&log_magnitude).ok_or(AnalysisError::InvalidGridSize {
        name: "n_alpha",
        value: params.n_alpha,
    })?;

    debug!("surface bounds: {:.1} dB .. {:.1} dB", bounds.zmin, bounds.zmax);

    Ok(ScfSurface {
        alphas,
        frequencies: centered_frequencies(params.n_freq, sample_rate),
        magnitude,
        log_magnitude,
        bounds,
    })
}
