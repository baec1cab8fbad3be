use cycloscope_core::{
    compute_spectrum, cyclic_autocorrelation, cyclic_profile, dominant_frequency,
    nearest_alpha_index, scf_surface, spectral_correlation, AnalysisError, CafSequence,
    CyclicProfile, ProfileParams, ScfOptions, ScfScaling, ScfSlice, ScfSurface, Signal, Spectrum,
    SurfaceParams,
};
use wasm_bindgen::prelude::*;

fn to_js(e: AnalysisError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn scaling(normalize: bool) -> ScfScaling {
    if normalize {
        ScfScaling::ByTransformLength
    } else {
        ScfScaling::Unnormalized
    }
}

/// A signal held on the Rust side so repeated parameter changes do not copy
/// the samples across the JS boundary again
#[wasm_bindgen]
pub struct WasmAnalyzer {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl WasmAnalyzer {
    fn signal(&self) -> Result<Signal<'_>, AnalysisError> {
        Signal::new(&self.samples, self.sample_rate)
    }

    fn try_new(samples: Vec<f64>, sample_rate: f64) -> Result<WasmAnalyzer, AnalysisError> {
        Signal::new(&samples, sample_rate)?;
        Ok(WasmAnalyzer {
            samples,
            sample_rate,
        })
    }

    fn compute_spectrum(&self) -> Result<Spectrum, AnalysisError> {
        compute_spectrum(&self.signal()?)
    }

    fn compute_caf(&self, alpha: f64, max_lag: usize) -> Result<CafSequence, AnalysisError> {
        cyclic_autocorrelation(&self.signal()?, alpha, max_lag)
    }

    fn compute_lag_seconds(&self, max_lag: usize) -> Result<Vec<f64>, AnalysisError> {
        self.compute_caf(0.0, max_lag)
            .map(|caf| caf.lag_seconds(self.sample_rate))
    }

    fn compute_scf(
        &self,
        alpha: f64,
        max_lag: usize,
        centered: bool,
        normalize: bool,
    ) -> Result<ScfSlice, AnalysisError> {
        let caf = self.compute_caf(alpha, max_lag)?;
        let options = ScfOptions {
            n_freq: None,
            centered,
            scaling: scaling(normalize),
        };
        spectral_correlation(&caf, self.sample_rate, options)
    }

    fn compute_profile(
        &self,
        max_lag: usize,
        n_alpha: usize,
        n_freq: usize,
        target_frequency: Option<f64>,
    ) -> Result<CyclicProfile, AnalysisError> {
        let signal = self.signal()?;
        let target_frequency = match target_frequency {
            Some(f0) => f0,
            None => dominant_frequency(&signal)?,
        };
        let params = ProfileParams {
            max_lag,
            n_alpha,
            n_freq,
            ..ProfileParams::new(target_frequency)
        };
        cyclic_profile(&signal, &params)
    }

    fn compute_surface(
        &self,
        max_lag: usize,
        n_alpha: usize,
        n_freq: usize,
    ) -> Result<ScfSurface, AnalysisError> {
        let params = SurfaceParams {
            max_lag,
            n_alpha,
            n_freq,
            ..SurfaceParams::default()
        };
        scf_surface(&self.signal()?, &params)
    }
}

#[wasm_bindgen]
impl WasmAnalyzer {
    /// Takes a Float64Array of samples and the sample rate in Hz
    #[wasm_bindgen(constructor)]
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<WasmAnalyzer, JsValue> {
        Self::try_new(samples, sample_rate).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.samples.len()
    }

    /// Magnitudes of bins 0..=N/2
    pub fn spectrum_magnitudes(&self) -> Result<Vec<f64>, JsValue> {
        self.compute_spectrum().map(|s| s.magnitudes).map_err(to_js)
    }

    pub fn spectrum_phases(&self) -> Result<Vec<f64>, JsValue> {
        self.compute_spectrum().map(|s| s.phases).map_err(to_js)
    }

    pub fn spectrum_frequencies(&self) -> Result<Vec<f64>, JsValue> {
        self.compute_spectrum().map(|s| s.frequencies).map_err(to_js)
    }

    /// Strongest non-DC frequency, rounded to 0.1 Hz
    pub fn dominant_frequency(&self) -> Result<f64, JsValue> {
        dominant_frequency(&self.signal().map_err(to_js)?).map_err(to_js)
    }

    /// CAF values for lags -max_lag..=max_lag
    pub fn caf(&self, alpha: f64, max_lag: usize) -> Result<Vec<f64>, JsValue> {
        self.compute_caf(alpha, max_lag).map(|c| c.values).map_err(to_js)
    }

    /// Lag axis in seconds matching [`WasmAnalyzer::caf`]
    pub fn caf_lag_seconds(&self, max_lag: usize) -> Result<Vec<f64>, JsValue> {
        self.compute_lag_seconds(max_lag).map_err(to_js)
    }

    pub fn scf(
        &self,
        alpha: f64,
        max_lag: usize,
        centered: bool,
        normalize: bool,
    ) -> Result<WasmScfSlice, JsValue> {
        self.compute_scf(alpha, max_lag, centered, normalize)
            .map(|inner| WasmScfSlice { inner })
            .map_err(to_js)
    }

    /// Profile at `target_frequency`, or at the dominant frequency when omitted
    pub fn profile(
        &self,
        max_lag: usize,
        n_alpha: usize,
        n_freq: usize,
        target_frequency: Option<f64>,
    ) -> Result<WasmProfile, JsValue> {
        self.compute_profile(max_lag, n_alpha, n_freq, target_frequency)
            .map(|inner| WasmProfile { inner })
            .map_err(to_js)
    }

    pub fn surface(
        &self,
        max_lag: usize,
        n_alpha: usize,
        n_freq: usize,
    ) -> Result<WasmSurface, JsValue> {
        self.compute_surface(max_lag, n_alpha, n_freq)
            .map(|inner| WasmSurface { inner })
            .map_err(to_js)
    }
}

#[wasm_bindgen]
pub struct WasmScfSlice {
    inner: ScfSlice,
}

#[wasm_bindgen]
impl WasmScfSlice {
    pub fn frequencies(&self) -> Vec<f64> {
        self.inner.frequencies.clone()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.inner.magnitudes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn centered(&self) -> bool {
        self.inner.centered
    }
}

#[wasm_bindgen]
pub struct WasmProfile {
    inner: CyclicProfile,
}

#[wasm_bindgen]
impl WasmProfile {
    pub fn alphas(&self) -> Vec<f64> {
        self.inner.alphas.clone()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.inner.magnitudes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn target_frequency(&self) -> f64 {
        self.inner.target_frequency
    }

    #[wasm_bindgen(getter)]
    pub fn bin(&self) -> usize {
        self.inner.bin
    }

    /// Grid index nearest `alpha`, for the current-alpha marker
    pub fn alpha_index(&self, alpha: f64) -> Option<usize> {
        nearest_alpha_index(&self.inner.alphas, alpha)
    }
}

/// Surface with the dB grid flattened row-major (one row per alpha)
#[wasm_bindgen]
pub struct WasmSurface {
    inner: ScfSurface,
}

#[wasm_bindgen]
impl WasmSurface {
    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> usize {
        self.inner.shape().0
    }

    #[wasm_bindgen(getter)]
    pub fn cols(&self) -> usize {
        self.inner.shape().1
    }

    pub fn alphas(&self) -> Vec<f64> {
        self.inner.alphas.clone()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.inner.frequencies.clone()
    }

    pub fn log_magnitude(&self) -> Vec<f64> {
        self.inner.log_magnitude.iter().flatten().copied().collect()
    }

    #[wasm_bindgen(getter)]
    pub fn zmin(&self) -> f64 {
        self.inner.bounds.zmin
    }

    #[wasm_bindgen(getter)]
    pub fn zmax(&self) -> f64 {
        self.inner.bounds.zmax
    }
}
