use log::debug;

use crate::caf::CafSequence;
use crate::dft::{center_shift, centered_frequencies, magnitude_spectrum, wrapped_frequencies};
use crate::error::{AnalysisError, Result};

/// Scaling applied to the SCF magnitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScfScaling {
    /// Raw DFT magnitude of the count-normalized CAF
    #[default]
    Unnormalized,
    /// Magnitudes divided by the transform length
    ByTransformLength,
}

/// Options for [`spectral_correlation`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScfOptions {
    /// Transform length; `None` uses the CAF length
    pub n_freq: Option<usize>,
    /// Rotate the output so 0 Hz sits in the middle
    pub centered: bool,
    pub scaling: ScfScaling,
}

impl ScfOptions {
    pub fn centered() -> Self {
        Self {
            centered: true,
            ..Self::default()
        }
    }

    pub fn with_n_freq(mut self, n_freq: usize) -> Self {
        self.n_freq = Some(n_freq);
        self
    }

    pub fn with_scaling(mut self, scaling: ScfScaling) -> Self {
        self.scaling = scaling;
        self
    }
}

/// |S_x(f, alpha)| for one cyclic frequency
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScfSlice {
    pub alpha: f64,
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
    pub centered: bool,
}

impl ScfSlice {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Bin spacing in Hz
    pub fn resolution(&self) -> f64 {
        match self.frequencies.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

/// Transform a CAF sequence over lag into a spectral correlation slice
///
/// The DFT runs over the CAF values in lag order (`-max_lag` first) without
/// windowing. Lag order only changes the phase, so magnitudes are unaffected.
/// Resolution is `sample_rate / L` where `L` is the transform length.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidGridSize` for a zero transform length, or
/// `AnalysisError::InvalidSampleRate` for a non-positive sample rate.
pub fn spectral_correlation(caf: &CafSequence, sample_rate: f64, options: ScfOptions) -> Result<ScfSlice> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AnalysisError::InvalidSampleRate(sample_rate));
    }

    let len = options.n_freq.unwrap_or(caf.len());
    if len == 0 {
        return Err(AnalysisError::InvalidGridSize {
            name: "n_freq",
            value: len,
        });
    }

    debug!(
        "scf: alpha={} Hz, {} caf values, transform length {}, centered={}, scaling={:?}",
        caf.alpha,
        caf.len(),
        len,
        options.centered,
        options.scaling
    );

    let mut magnitudes = magnitude_spectrum(&caf.values, len)?;
    if options.scaling == ScfScaling::ByTransformLength {
        let scale = 1.0 / len as f64;
        magnitudes.iter_mut().for_each(|m| *m *= scale);
    }

    let (frequencies, magnitudes) = if options.centered {
        (centered_frequencies(len, sample_rate), center_shift(&magnitudes))
    } else {
        (wrapped_frequencies(len, sample_rate), magnitudes)
    };

    Ok(ScfSlice {
        alpha: caf.alpha,
        frequencies,
        magnitudes,
        centered: options.centered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caf::cyclic_autocorrelation;
    use crate::signal::Signal;
    use std::f64::consts::PI;

    fn sine_caf(alpha: f64) -> CafSequence {
        let samples: Vec<f64> = (0..1000)
            .map(|n| (2.0 * PI * 10.0 * n as f64 / 1000.0).sin())
            .collect();
        let signal = Signal::new(&samples, 1000.0).unwrap();
        cyclic_autocorrelation(&signal, alpha, 100).unwrap()
    }

    #[test]
    fn test_scf_default_length_is_caf_length() {
        let caf = sine_caf(0.0);
        let scf = spectral_correlation(&caf, 1000.0, ScfOptions::default()).unwrap();
        assert_eq!(scf.len(), 201);
        assert!(!scf.centered);
        assert!((scf.resolution() - 1000.0 / 201.0).abs() < 1e-9);
        assert!(scf.magnitudes.iter().all(|&m| m >= 0.0));
    }

    #[test]
    fn test_scf_centered_peaks_at_plus_minus_f0() {
        let caf = sine_caf(0.0);
        let scf = spectral_correlation(&caf, 1000.0, ScfOptions::centered()).unwrap();

        // Resolution is 1000/201 Hz, so 10 Hz is nearest bin offset 2
        let center = scf.len() / 2;
        assert_eq!(scf.frequencies[center], 0.0);

        let (peak_idx, _) = scf
            .magnitudes
            .iter()
            .enumerate()
            .take(center)
            .fold((0, f64::MIN), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) });
        let mirrored = 2 * center - peak_idx;
        assert!((scf.frequencies[peak_idx] + 10.0).abs() < 1000.0 / 201.0);
        assert!((scf.magnitudes[peak_idx] - scf.magnitudes[mirrored]).abs() < 1e-9);
    }

    #[test]
    fn test_scf_small_away_from_cycle_frequencies() {
        let reference = spectral_correlation(&sine_caf(0.0), 1000.0, ScfOptions::centered()).unwrap();
        let off = spectral_correlation(&sine_caf(100.0), 1000.0, ScfOptions::centered()).unwrap();

        let reference_peak = reference.magnitudes.iter().cloned().fold(0.0, f64::max);
        let off_peak = off.magnitudes.iter().cloned().fold(0.0, f64::max);
        assert!(
            off_peak < 0.05 * reference_peak,
            "off-cycle peak {} vs reference {}",
            off_peak,
            reference_peak
        );
    }

    #[test]
    fn test_scf_custom_transform_length() {
        let caf = sine_caf(0.0);
        let scf = spectral_correlation(&caf, 1000.0, ScfOptions::default().with_n_freq(64)).unwrap();
        assert_eq!(scf.len(), 64);
        assert_eq!(scf.frequencies[32], 500.0);
        assert_eq!(scf.frequencies[33], -31.0 * 1000.0 / 64.0);
    }

    #[test]
    fn test_scf_scaling_by_transform_length() {
        let caf = sine_caf(0.0);
        let raw = spectral_correlation(&caf, 1000.0, ScfOptions::default()).unwrap();
        let scaled = spectral_correlation(
            &caf,
            1000.0,
            ScfOptions::default().with_scaling(ScfScaling::ByTransformLength),
        )
        .unwrap();
        for (r, s) in raw.magnitudes.iter().zip(scaled.magnitudes.iter()) {
            assert!((r / 201.0 - s).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scf_rejects_zero_length() {
        let caf = sine_caf(0.0);
        assert!(matches!(
            spectral_correlation(&caf, 1000.0, ScfOptions::default().with_n_freq(0)),
            Err(AnalysisError::InvalidGridSize { name: "n_freq", value: 0 })
        ));
        assert!(spectral_correlation(&caf, 0.0, ScfOptions::default()).is_err());
    }
}
