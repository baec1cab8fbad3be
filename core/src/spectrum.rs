use log::debug;

use crate::dft::real_spectrum;
use crate::error::Result;
use crate::signal::Signal;

/// Magnitude and phase of a real signal over bins `0..=N/2` (DC to Nyquist)
///
/// Magnitudes are raw DFT magnitudes with no `1/N` scaling, so a sinusoid of
/// amplitude `A` sitting exactly on a bin peaks at roughly `N * A / 2`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
    pub phases: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Index of the largest magnitude, first occurrence on ties
    pub fn peak_bin(&self) -> Option<usize> {
        argmax_from(&self.magnitudes, 0)
    }
}

/// Index of the largest value in `values[start..]`, first occurrence on ties
pub(crate) fn argmax_from(values: &[f64], start: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, &value) in values.iter().enumerate().skip(start) {
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((k, value)),
        }
    }
    best.map(|(k, _)| k)
}

/// Compute the one-sided DFT spectrum of `signal`
///
/// An empty signal yields an empty spectrum rather than an error.
///
/// # Errors
///
/// Returns `AnalysisError::Fft` if the transform fails.
pub fn compute_spectrum(signal: &Signal) -> Result<Spectrum> {
    debug!(
        "spectrum: {} samples at {} Hz",
        signal.len(),
        signal.sample_rate()
    );

    if signal.is_empty() {
        return Ok(Spectrum::default());
    }

    let bins = real_spectrum(signal.samples())?;
    let bin_width = signal.bin_width();

    let frequencies = (0..bins.len()).map(|k| k as f64 * bin_width).collect();
    let magnitudes = bins.iter().map(|c| c.norm()).collect();
    let phases = bins.iter().map(|c| c.im.atan2(c.re)).collect();

    Ok(Spectrum {
        frequencies,
        magnitudes,
        phases,
    })
}
