use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use cycloscope_core::input::{mix_to_mono, pcm_to_f64};
use cycloscope_core::{AnalysisError, Signal};
use serde::Serialize;
use tracing::info;

use crate::error::{CliError, Result};

/// Samples read from disk, owned here and lent to the engine as a [`Signal`]
#[derive(Debug, Clone)]
pub struct LoadedSignal {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
}

impl LoadedSignal {
    pub fn signal(&self) -> std::result::Result<Signal<'_>, AnalysisError> {
        Signal::new(&self.samples, self.sample_rate)
    }
}

/// Load a mono signal from a `.wav` file or a `.json` array of samples
///
/// `sample_rate` overrides the WAV header and is required for JSON input.
pub fn load_signal(path: &Path, sample_rate: Option<f64>) -> Result<LoadedSignal> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let loaded = match extension.as_deref() {
        Some("wav") => {
            let (samples, header_rate) = read_wav(path)?;
            LoadedSignal {
                samples,
                sample_rate: sample_rate.unwrap_or(header_rate as f64),
            }
        }
        Some("json") => {
            let sample_rate =
                sample_rate.ok_or_else(|| CliError::MissingSampleRate(path.display().to_string()))?;
            let reader = BufReader::new(File::open(path)?);
            let samples: Vec<f64> = serde_json::from_reader(reader)?;
            LoadedSignal { samples, sample_rate }
        }
        _ => return Err(CliError::UnsupportedInput(path.display().to_string())),
    };

    info!(
        "Loaded {} samples at {} Hz from {}",
        loaded.samples.len(),
        loaded.sample_rate,
        path.display()
    );
    Ok(loaded)
}

/// Read a WAV file, mixing all channels down to mono
fn read_wav(path: &Path) -> Result<(Vec<f64>, u32)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    info!(
        "Read WAV: {} Hz, {} channels, {} bits, {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    // Extract samples (integer PCM of any width, or 32-bit float)
    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| pcm_to_f64(v, spec.bits_per_sample)))
            .collect::<std::result::Result<_, _>>()?,
    };

    let mono = mix_to_mono(&interleaved, spec.channels as usize)?;
    Ok((mono, spec.sample_rate))
}

/// Write `value` as JSON to `output`, or to stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text)?;
        }
    }
    Ok(())
}
