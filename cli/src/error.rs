use cycloscope_core::AnalysisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),

    #[error("Sample rate required for {0} (pass --sample-rate)")]
    MissingSampleRate(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
