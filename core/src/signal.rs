use crate::error::{AnalysisError, Result};

/// A borrowed real-valued sample sequence paired with its sample rate
///
/// The engine only ever reads through this view; the caller keeps ownership
/// of the samples for as long as any computation runs.
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    samples: &'a [f64],
    sample_rate: f64,
}

impl<'a> Signal<'a> {
    /// Wrap `samples` recorded at `sample_rate` Hz
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidSampleRate` if the rate is not finite or not positive.
    pub fn new(samples: &'a [f64], sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &'a [f64] {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Spacing between adjacent bins of a full-length DFT (sample_rate / N)
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.samples.len() as f64
    }

    /// Check that `max_lag` leaves at least one overlapping sample at every lag
    pub(crate) fn check_max_lag(&self, max_lag: usize) -> Result<()> {
        if max_lag >= self.samples.len() {
            return Err(AnalysisError::InvalidMaxLag {
                max_lag,
                len: self.samples.len(),
            });
        }
        Ok(())
    }
}
