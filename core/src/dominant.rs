use log::debug;

use crate::error::{AnalysisError, Result};
use crate::signal::Signal;
use crate::spectrum::{argmax_from, compute_spectrum};
use crate::DOMINANT_FREQUENCY_STEP;

/// Index of the strongest non-DC bin of the signal's spectrum
///
/// Ties resolve to the lowest bin.
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientSamples` for signals shorter than two
/// samples (no non-DC bin exists).
pub fn dominant_bin(signal: &Signal) -> Result<usize> {
    if signal.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            needed: 2,
            got: signal.len(),
        });
    }

    let spectrum = compute_spectrum(signal)?;
    argmax_from(&spectrum.magnitudes, 1).ok_or(AnalysisError::InsufficientSamples {
        needed: 2,
        got: signal.len(),
    })
}

/// Frequency in Hz of the strongest non-DC bin, rounded to the nearest 0.1 Hz
///
/// # Errors
///
/// Same as [`dominant_bin`].
pub fn dominant_frequency(signal: &Signal) -> Result<f64> {
    let bin = dominant_bin(signal)?;
    let raw = bin as f64 * signal.bin_width();
    let scale = 1.0 / DOMINANT_FREQUENCY_STEP;
    let rounded = (raw * scale).round() / scale;
    debug!("dominant frequency: bin {} -> {:.1} Hz", bin, rounded);
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_dominant_frequency_pure_sine() {
        let samples: Vec<f64> = (0..1000)
            .map(|n| (2.0 * PI * 10.0 * n as f64 / 1000.0).sin())
            .collect();
        let signal = Signal::new(&samples, 1000.0).unwrap();
        assert_eq!(dominant_bin(&signal).unwrap(), 10);
        assert!((dominant_frequency(&signal).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_frequency_ignores_dc() {
        // Large DC offset plus a small tone at 50 Hz
        let samples: Vec<f64> = (0..200)
            .map(|n| 5.0 + 0.1 * (2.0 * PI * 50.0 * n as f64 / 200.0).cos())
            .collect();
        let signal = Signal::new(&samples, 200.0).unwrap();
        assert_eq!(dominant_bin(&signal).unwrap(), 50);
    }

    #[test]
    fn test_dominant_frequency_rounds_to_tenth() {
        // 3 samples at 1 Hz: bin width 1/3 Hz
        let samples = [0.0, 1.0, -1.0];
        let signal = Signal::new(&samples, 1.0).unwrap();
        let freq = dominant_frequency(&signal).unwrap();
        assert!((freq - 0.3).abs() < 1e-9, "got {}", freq);
    }

    #[test]
    fn test_dominant_frequency_requires_two_samples() {
        let samples = [1.0];
        let signal = Signal::new(&samples, 100.0).unwrap();
        assert_eq!(
            dominant_frequency(&signal).unwrap_err(),
            AnalysisError::InsufficientSamples { needed: 2, got: 1 }
        );

        let empty = Signal::new(&[], 100.0).unwrap();
        assert!(dominant_frequency(&empty).is_err());
    }
}
