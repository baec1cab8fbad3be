use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn tmp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("cycloscope-cli-tests");
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

/// 16-bit mono WAV of a unit sine, written with hound
fn create_sine_wav(name: &str, freq: f64, sample_rate: u32, len: usize) -> PathBuf {
    let path = tmp_dir().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
    for n in 0..len {
        let sample = (2.0 * PI * freq * n as f64 / sample_rate as f64).sin();
        writer
            .write_sample((sample * 32767.0) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
    path
}

fn create_json_samples(name: &str, samples: &[f64]) -> PathBuf {
    let path = tmp_dir().join(name);
    fs::write(&path, serde_json::to_string(samples).unwrap()).expect("Failed to write test file");
    path
}

fn run_cycloscope(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cycloscope"))
        .args(args)
        .output()
        .expect("Failed to execute cycloscope")
}

fn run_json(args: &[&str]) -> Value {
    let output = run_cycloscope(args);
    assert!(
        output.status.success(),
        "cycloscope {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_dominant_from_wav() {
    let wav = create_sine_wav("dominant.wav", 10.0, 1000, 1000);
    let value = run_json(&["dominant", wav.to_str().unwrap()]);

    assert_eq!(value["bin"], 10);
    assert!((value["frequency"].as_f64().unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn test_spectrum_from_json_with_sample_rate() {
    let samples: Vec<f64> = (0..64)
        .map(|n| (2.0 * PI * 4.0 * n as f64 / 64.0).cos())
        .collect();
    let input = create_json_samples("spectrum.json", &samples);
    let value = run_json(&["spectrum", input.to_str().unwrap(), "--sample-rate", "64"]);

    let magnitudes = value["magnitudes"].as_array().unwrap();
    assert_eq!(magnitudes.len(), 33);
    assert!((magnitudes[4].as_f64().unwrap() - 32.0).abs() < 1e-6);
    assert_eq!(value["frequencies"][4], 4.0);
}

#[test]
fn test_json_input_without_sample_rate_fails() {
    let input = create_json_samples("no_rate.json", &[0.0, 1.0, 0.0, -1.0]);
    let output = run_cycloscope(&["spectrum", input.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Sample rate required"), "stderr: {}", stderr);
}

#[test]
fn test_caf_rejects_max_lag_beyond_signal() {
    let wav = create_sine_wav("short.wav", 10.0, 1000, 50);
    let output = run_cycloscope(&["caf", wav.to_str().unwrap(), "--max-lag", "50"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid max lag"), "stderr: {}", stderr);
}

#[test]
fn test_scf_writes_output_file() {
    let wav = create_sine_wav("scf.wav", 10.0, 1000, 1000);
    let out = tmp_dir().join("scf.json");
    let _ = fs::remove_file(&out);

    let output = run_cycloscope(&[
        "scf",
        wav.to_str().unwrap(),
        "--alpha",
        "0",
        "--max-lag",
        "100",
        "--output",
        out.to_str().unwrap(),
        "--pretty",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let value: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["centered"], true);
    assert_eq!(value["frequencies"].as_array().unwrap().len(), 201);
}

#[test]
fn test_profile_marks_current_alpha() {
    let wav = create_sine_wav("profile.wav", 10.0, 1000, 1000);
    let value = run_json(&[
        "profile",
        wav.to_str().unwrap(),
        "--max-lag",
        "50",
        "--alpha",
        "20",
    ]);

    assert_eq!(value["alpha_index"], 2);
    assert_eq!(value["profile"]["alphas"].as_array().unwrap().len(), 32);
    assert!((value["profile"]["target_frequency"].as_f64().unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn test_report_with_surface() {
    let wav = create_sine_wav("report.wav", 40.0, 1000, 500);
    let value = run_json(&[
        "report",
        wav.to_str().unwrap(),
        "--max-lag",
        "30",
        "--n-alpha",
        "6",
        "--n-freq",
        "16",
        "--surface",
    ]);

    assert!((value["dominant_frequency"].as_f64().unwrap() - 40.0).abs() < 1e-9);
    assert_eq!(value["caf"]["lags"].as_array().unwrap().len(), 61);
    assert_eq!(value["surface"]["alphas"].as_array().unwrap().len(), 6);
    let zmin = value["surface"]["bounds"]["zmin"].as_f64().unwrap();
    let zmax = value["surface"]["bounds"]["zmax"].as_f64().unwrap();
    assert!(zmin <= zmax);
}
