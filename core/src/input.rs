//! Sample preparation for signals read from audio files
//!
//! Decoders hand over interleaved frames of integer or float PCM; the engine
//! wants a single channel of `f64`.

use crate::error::{AnalysisError, Result};

/// Mix interleaved multi-channel audio down to mono by averaging each frame
///
/// # Arguments
/// * `samples` - Interleaved audio samples [c0, c1, ..., c0, c1, ...]
/// * `channels` - Number of interleaved channels
///
/// # Errors
/// `AnalysisError::InvalidChannelLayout` if `channels` is zero or the sample
/// count is not a whole number of frames.
pub fn mix_to_mono(samples: &[f64], channels: usize) -> Result<Vec<f64>> {
    if channels == 0 || samples.len() % channels != 0 {
        return Err(AnalysisError::InvalidChannelLayout {
            len: samples.len(),
            channels,
        });
    }

    if channels == 1 {
        return Ok(samples.to_vec());
    }

    let scale = 1.0 / channels as f64;
    Ok(samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() * scale)
        .collect())
}

/// Scale a signed integer PCM sample of `bits` width into [-1.0, 1.0)
///
/// # Example
/// ```
/// use cycloscope_core::input::pcm_to_f64;
/// assert_eq!(pcm_to_f64(-32768, 16), -1.0);
/// assert_eq!(pcm_to_f64(16384, 16), 0.5);
/// ```
pub fn pcm_to_f64(sample: i32, bits: u16) -> f64 {
    let full_scale = (1u64 << (bits.clamp(1, 32) - 1)) as f64;
    sample as f64 / full_scale
}
