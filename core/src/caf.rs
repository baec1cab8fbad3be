//! Cyclic autocorrelation estimator
//!
//! Estimates the real part of
//!
//! ```text
//! R_x(tau, alpha) = E[ x(n) x(n - tau) e^(-j 2 pi alpha n / fs) ]
//! ```
//!
//! for `tau` in `-max_lag..=max_lag`. Each lag averages over the samples
//! where both `x(n)` and `x(n - tau)` exist, so the number of contributing
//! terms shrinks as `|tau|` grows. The resulting edge taper is part of the
//! estimator and is reproduced as-is: no zero-padding, no unbiasing.

use std::f64::consts::PI;

use log::{debug, trace};

use crate::error::{AnalysisError, Result};
use crate::signal::Signal;

/// Cyclic autocorrelation values for one cyclic frequency over a symmetric lag range
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CafSequence {
    /// Cyclic frequency in Hz
    pub alpha: f64,
    /// Lags in samples, `-max_lag..=max_lag`
    pub lags: Vec<isize>,
    pub values: Vec<f64>,
}

impl CafSequence {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_lag(&self) -> usize {
        self.values.len() / 2
    }

    /// Value at `lag` samples, `None` outside the computed range
    pub fn value_at(&self, lag: isize) -> Option<f64> {
        let index = lag + self.max_lag() as isize;
        if index < 0 {
            return None;
        }
        self.values.get(index as usize).copied()
    }

    /// Lag axis in seconds
    pub fn lag_seconds(&self, sample_rate: f64) -> Vec<f64> {
        self.lags.iter().map(|&lag| lag as f64 / sample_rate).collect()
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(AnalysisError::InvalidAlpha(alpha));
    }
    Ok(())
}

/// Estimate the cyclic autocorrelation of `signal` at cyclic frequency `alpha` (Hz)
///
/// Returns `2 * max_lag + 1` values. At `alpha = 0` this is the ordinary
/// biased autocorrelation estimate.
///
/// # Errors
///
/// - `AnalysisError::InvalidAlpha` if `alpha` is negative or not finite
/// - `AnalysisError::InvalidMaxLag` if `max_lag >= signal.len()`
pub fn cyclic_autocorrelation(signal: &Signal, alpha: f64, max_lag: usize) -> Result<CafSequence> {
    check_alpha(alpha)?;
    signal.check_max_lag(max_lag)?;

    debug!(
        "caf: alpha={} Hz, max_lag={}, {} samples at {} Hz",
        alpha,
        max_lag,
        signal.len(),
        signal.sample_rate()
    );

    let x = signal.samples();
    let len = x.len() as isize;

    // cos(-2 pi alpha n / fs) does not depend on the lag, so evaluate it once per sample
    let step = -2.0 * PI * alpha / signal.sample_rate();
    let carrier: Vec<f64> = (0..x.len()).map(|n| (step * n as f64).cos()).collect();

    let max_lag = max_lag as isize;
    let mut lags = Vec::with_capacity((2 * max_lag + 1) as usize);
    let mut values = Vec::with_capacity((2 * max_lag + 1) as usize);

    for lag in -max_lag..=max_lag {
        // Valid n satisfy 0 <= n < N and 0 <= n - lag < N
        let start = lag.max(0);
        let end = len + lag.min(0);

        let mut sum = 0.0;
        for n in start..end {
            sum += x[n as usize] * x[(n - lag) as usize] * carrier[n as usize];
        }

        let count = (end - start).max(0);
        let value = if count > 0 { sum / count as f64 } else { 0.0 };
        trace!("caf lag {}: {} terms, value {}", lag, count, value);

        lags.push(lag);
        values.push(value);
    }

    Ok(CafSequence { alpha, lags, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| amplitude * (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_caf_length_and_lags() {
        let samples = sine(10.0, 1.0, 1000.0, 1000);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 100).unwrap();
        assert_eq!(caf.len(), 201);
        assert_eq!(caf.max_lag(), 100);
        assert_eq!(caf.lags[0], -100);
        assert_eq!(caf.lags[100], 0);
        assert_eq!(caf.lags[200], 100);
    }

    #[test]
    fn test_caf_zero_lag_of_unit_sine() {
        let samples = sine(10.0, 1.0, 1000.0, 1000);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 100).unwrap();
        let r0 = caf.value_at(0).unwrap();
        assert!((r0 - 0.5).abs() < 1e-3, "R(0) = {}", r0);
    }

    #[test]
    fn test_caf_symmetric_at_alpha_zero() {
        let samples: Vec<f64> = (0..257)
            .map(|n| (n as f64 * 0.3).sin() + 0.5 * (n as f64 * 0.071).cos() + 0.01 * n as f64)
            .collect();
        let signal = Signal::new(&samples, 500.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 60).unwrap();
        for lag in 1..=60 {
            let pos = caf.value_at(lag).unwrap();
            let neg = caf.value_at(-lag).unwrap();
            assert!((pos - neg).abs() < 1e-12, "lag {}: {} vs {}", lag, pos, neg);
        }
    }

    #[test]
    fn test_caf_sine_follows_cosine_in_interior() {
        let samples = sine(10.0, 1.0, 1000.0, 1000);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 100).unwrap();

        for lag in [-50isize, -25, -10, 0, 10, 25, 50] {
            let expected = 0.5 * (2.0 * PI * 10.0 * lag as f64 / 1000.0).cos();
            let actual = caf.value_at(lag).unwrap();
            assert!(
                (actual - expected).abs() < 0.02,
                "lag {}: expected {}, got {}",
                lag,
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_caf_sine_at_twice_carrier() {
        // sin^2 has a component at 2 f0, so the CAF at alpha = 2 f0 is about -A^2/4 at zero lag
        let samples = sine(10.0, 1.0, 1000.0, 1000);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 20.0, 10).unwrap();
        let r0 = caf.value_at(0).unwrap();
        assert!((r0 + 0.25).abs() < 1e-3, "R(0, 2f0) = {}", r0);
    }

    #[test]
    fn test_caf_sine_off_cycle_frequency_is_small() {
        let samples = sine(10.0, 1.0, 1000.0, 1000);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 3.0, 10).unwrap();
        assert!(caf.value_at(0).unwrap().abs() < 1e-3);
    }

    #[test]
    fn test_caf_edge_taper_uses_overlap_count() {
        // Constant signal: every product is 1, so every lag averages to exactly 1
        let samples = vec![1.0; 8];
        let signal = Signal::new(&samples, 8.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 7).unwrap();
        for value in &caf.values {
            assert!((value - 1.0).abs() < 1e-12);
        }

        // Ramp: at the extreme lag only one product remains
        let samples = [1.0, 2.0, 3.0, 4.0];
        let signal = Signal::new(&samples, 4.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 3).unwrap();
        assert!((caf.value_at(3).unwrap() - 4.0).abs() < 1e-12); // x[3] * x[0]
        assert!((caf.value_at(-3).unwrap() - 4.0).abs() < 1e-12); // x[0] * x[3]
        assert!((caf.value_at(2).unwrap() - (3.0 + 8.0) / 2.0).abs() < 1e-12);
        assert!((caf.value_at(0).unwrap() - 30.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_caf_zero_max_lag() {
        let samples = [2.0, -2.0];
        let signal = Signal::new(&samples, 2.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 0.0, 0).unwrap();
        assert_eq!(caf.values, vec![4.0]);
    }

    #[test]
    fn test_caf_lag_seconds() {
        let samples = vec![0.0; 10];
        let signal = Signal::new(&samples, 100.0).unwrap();
        let caf = cyclic_autocorrelation(&signal, 1.0, 2).unwrap();
        assert_eq!(caf.lag_seconds(100.0), vec![-0.02, -0.01, 0.0, 0.01, 0.02]);
        assert_eq!(caf.value_at(3), None);
        assert_eq!(caf.value_at(-3), None);
    }

    #[test]
    fn test_caf_rejects_bad_parameters() {
        let samples = vec![0.0; 10];
        let signal = Signal::new(&samples, 100.0).unwrap();
        assert_eq!(
            cyclic_autocorrelation(&signal, 0.0, 10).unwrap_err(),
            AnalysisError::InvalidMaxLag { max_lag: 10, len: 10 }
        );
        assert!(matches!(
            cyclic_autocorrelation(&signal, -1.0, 2),
            Err(AnalysisError::InvalidAlpha(_))
        ));
        assert!(cyclic_autocorrelation(&signal, f64::NAN, 2).is_err());

        let empty = Signal::new(&[], 100.0).unwrap();
        assert!(cyclic_autocorrelation(&empty, 0.0, 0).is_err());
    }

    #[test]
    fn test_caf_is_deterministic() {
        let samples = sine(7.0, 0.8, 250.0, 300);
        let signal = Signal::new(&samples, 250.0).unwrap();
        let a = cyclic_autocorrelation(&signal, 14.0, 40).unwrap();
        let b = cyclic_autocorrelation(&signal, 14.0, 40).unwrap();
        assert_eq!(a, b);
    }
}
