//! Real-input DFT helpers shared by every analysis stage
//!
//! All transforms use the forward convention `X[k] = sum_n x[n] e^(-j 2 pi k n / L)`
//! with no normalization. Plans come from a thread-local `RealFftPlanner`, so
//! repeated transforms of the same length (the common case when sweeping an
//! alpha grid) reuse twiddles instead of replanning.
//!
//! # Transform length vs input length
//!
//! [`magnitude_spectrum`] evaluates the DFT sum at an arbitrary length `L`:
//!
//! - `L >= values.len()`: identical to zero-padding the input to `L`.
//! - `L < values.len()`: the sum still runs over every input sample, so the
//!   input is time-aliased (sample `n` lands in slot `n mod L`) before the
//!   transform. This is exact, not an approximation: `e^(-j 2 pi k n / L)` is
//!   periodic in `n` with period `L`.

use std::cell::RefCell;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::{AnalysisError, Result};

thread_local! {
    static PLANNER: RefCell<RealFftPlanner<f64>> = RefCell::new(RealFftPlanner::new());
}

fn plan_forward(len: usize) -> Arc<dyn RealToComplex<f64>> {
    PLANNER.with(|planner| planner.borrow_mut().plan_fft_forward(len))
}

/// Forward DFT of a real sequence, bins `0..=len/2`
///
/// Returns an empty vector for empty input.
///
/// # Errors
///
/// Returns `AnalysisError::Fft` if the transform fails.
pub fn real_spectrum(values: &[f64]) -> Result<Vec<Complex<f64>>> {
    match values {
        [] => return Ok(Vec::new()),
        [x] => return Ok(vec![Complex::new(*x, 0.0)]),
        [x0, x1] => return Ok(vec![Complex::new(x0 + x1, 0.0), Complex::new(x0 - x1, 0.0)]),
        _ => {}
    }

    let r2c = plan_forward(values.len());

    // realfft uses the input buffer as scratch space
    let mut input = values.to_vec();
    let mut output = r2c.make_output_vec();
    debug_assert_eq!(output.len(), values.len() / 2 + 1, "Spectrum buffer size mismatch");

    r2c.process(&mut input, &mut output).map_err(|e| {
        AnalysisError::Fft(format!(
            "forward transform of {} samples failed: {:?}",
            values.len(),
            e
        ))
    })?;

    Ok(output)
}

/// Magnitudes of all `len` bins of the length-`len` DFT of `values`
///
/// The upper half is mirrored from the lower half (`|X[len-k]| = |X[k]|` for
/// real input), so only one real FFT is run.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidGridSize` if `len` is zero, or
/// `AnalysisError::Fft` if the transform fails.
pub fn magnitude_spectrum(values: &[f64], len: usize) -> Result<Vec<f64>> {
    if len == 0 {
        return Err(AnalysisError::InvalidGridSize {
            name: "transform length",
            value: len,
        });
    }

    let mut folded = vec![0.0; len];
    for (n, &value) in values.iter().enumerate() {
        folded[n % len] += value;
    }

    let half = real_spectrum(&folded)?;
    let magnitudes = (0..len)
        .map(|k| {
            let bin = if k < half.len() { k } else { len - k };
            half[bin].norm()
        })
        .collect();

    Ok(magnitudes)
}

/// Rotate `values` so the zero-frequency bin lands at index `len / 2`
///
/// `output[i] = values[(i + ceil(len / 2)) mod len]`, which puts the
/// negative-frequency bins first for both odd and even lengths.
pub fn center_shift<T: Copy>(values: &[T]) -> Vec<T> {
    let split = values.len() - values.len() / 2;
    let mut shifted = Vec::with_capacity(values.len());
    shifted.extend_from_slice(&values[split..]);
    shifted.extend_from_slice(&values[..split]);
    shifted
}

/// Frequency of each bin in natural DFT order
///
/// Bin `k` maps to `k * fs / len` for `k <= len / 2` and to `(k - len) * fs / len` above that.
pub fn wrapped_frequencies(len: usize, sample_rate: f64) -> Vec<f64> {
    let resolution = sample_rate / len as f64;
    (0..len)
        .map(|k| {
            if k <= len / 2 {
                k as f64 * resolution
            } else {
                (k as f64 - len as f64) * resolution
            }
        })
        .collect()
}

/// Frequency of each bin after [`center_shift`], strictly ascending
pub fn centered_frequencies(len: usize, sample_rate: f64) -> Vec<f64> {
    let resolution = sample_rate / len as f64;
    let center = (len / 2) as f64;
    (0..len).map(|i| (i as f64 - center) * resolution).collect()
}
