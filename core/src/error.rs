use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid sample rate: {0} (must be finite and > 0)")]
    InvalidSampleRate(f64),

    #[error("Invalid max lag {max_lag} for a signal of {len} samples (must be < signal length)")]
    InvalidMaxLag { max_lag: usize, len: usize },

    #[error("Invalid grid size for {name}: {value} (must be >= 1)")]
    InvalidGridSize { name: &'static str, value: usize },

    #[error("Invalid cyclic frequency: {0} Hz (must be finite and >= 0)")]
    InvalidAlpha(f64),

    #[error("Invalid target frequency: {0} Hz")]
    InvalidFrequency(f64),

    #[error("Insufficient samples: need at least {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("Invalid channel layout: {len} interleaved samples cannot be split into {channels} channels")]
    InvalidChannelLayout { len: usize, channels: usize },

    #[error("FFT error: {0}")]
    Fft(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
