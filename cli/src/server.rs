//! HTTP front end for the analysis engine
//!
//! Every analysis route takes a JSON body carrying the signal either as a
//! `samples` array or as `samples_b64` (base64 of little-endian f32) plus a
//! `sample_rate`, and answers with the engine's result as JSON. Engine
//! precondition failures come back as `400 {"error": "..."}`.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cycloscope_core::{
    analyze, compute_spectrum, cyclic_autocorrelation, cyclic_profile, dominant_bin,
    dominant_frequency, nearest_alpha_index, scf_surface, spectral_correlation, AlphaSpan,
    Analysis, AnalysisConfig, AnalysisError, CafSequence, CyclicProfile, ProfileParams,
    ScfOptions, ScfScaling, ScfSlice, ScfSurface, Signal, Spectrum, SurfaceParams,
    DEFAULT_MAX_LAG, DEFAULT_N_ALPHA, DEFAULT_N_FREQ,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::worker::LiveAnalysis;

#[derive(Clone)]
pub struct AppState {
    live: LiveAnalysis,
}

impl AppState {
    /// Must be called inside a tokio runtime (starts the live worker)
    pub fn new() -> Self {
        Self {
            live: LiveAnalysis::spawn(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/api/spectrum", post(spectrum))
        .route("/api/dominant", post(dominant))
        .route("/api/caf", post(caf))
        .route("/api/scf", post(scf))
        .route("/api/profile", post(profile))
        .route("/api/surface", post(surface))
        .route("/api/analyze", post(analysis))
        .route("/api/live", post(submit_live).get(latest_live))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr) -> Result<()> {
    let app = app(AppState::new());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Fft(_) => ApiError::Internal(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Signal fields shared by every request body
#[derive(Debug, Deserialize)]
pub struct SignalPayload {
    #[serde(default)]
    samples: Option<Vec<f64>>,
    #[serde(default)]
    samples_b64: Option<String>,
    sample_rate: f64,
}

impl SignalPayload {
    fn into_samples(self) -> std::result::Result<(Vec<f64>, f64), ApiError> {
        let samples = match (self.samples, self.samples_b64) {
            (Some(samples), None) => samples,
            (None, Some(encoded)) => decode_f32_le(&encoded)?,
            (Some(_), Some(_)) => {
                return Err(ApiError::BadRequest(
                    "provide either samples or samples_b64, not both".into(),
                ))
            }
            (None, None) => {
                return Err(ApiError::BadRequest(
                    "missing samples or samples_b64".into(),
                ))
            }
        };
        Ok((samples, self.sample_rate))
    }
}

fn decode_f32_le(encoded: &str) -> std::result::Result<Vec<f64>, ApiError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| ApiError::BadRequest(format!("invalid samples_b64: {}", e)))?;
    if bytes.len() % 4 != 0 {
        return Err(ApiError::BadRequest(format!(
            "samples_b64 decodes to {} bytes, not a whole number of f32 values",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
        .collect())
}

/// Run an engine call on the blocking pool
async fn compute<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> std::result::Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {}", e)))?
        .map(Json)
}

fn default_max_lag() -> usize {
    DEFAULT_MAX_LAG
}

fn default_n_alpha() -> usize {
    DEFAULT_N_ALPHA
}

fn default_n_freq() -> usize {
    DEFAULT_N_FREQ
}

fn default_centered() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SignalRequest {
    #[serde(flatten)]
    signal: SignalPayload,
}

#[derive(Debug, Deserialize)]
pub struct CafRequest {
    #[serde(flatten)]
    signal: SignalPayload,
    alpha: f64,
    #[serde(default = "default_max_lag")]
    max_lag: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScfRequest {
    #[serde(flatten)]
    signal: SignalPayload,
    alpha: f64,
    #[serde(default = "default_max_lag")]
    max_lag: usize,
    #[serde(default)]
    n_freq: Option<usize>,
    #[serde(default = "default_centered")]
    centered: bool,
    #[serde(default)]
    scaling: ScfScaling,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(flatten)]
    signal: SignalPayload,
    #[serde(default = "default_max_lag")]
    max_lag: usize,
    #[serde(default = "default_n_alpha")]
    n_alpha: usize,
    #[serde(default = "default_n_freq")]
    n_freq: usize,
    /// Spectral frequency f0; the dominant frequency when absent
    #[serde(default)]
    target_frequency: Option<f64>,
    /// Current cyclic frequency to mark on the profile
    #[serde(default)]
    alpha: Option<f64>,
    #[serde(default)]
    span: AlphaSpan,
    #[serde(default)]
    scaling: ScfScaling,
}

#[derive(Debug, Deserialize)]
pub struct SurfaceRequest {
    #[serde(flatten)]
    signal: SignalPayload,
    #[serde(default = "default_max_lag")]
    max_lag: usize,
    #[serde(default = "default_n_alpha")]
    n_alpha: usize,
    #[serde(default = "default_n_freq")]
    n_freq: usize,
    #[serde(default)]
    scaling: ScfScaling,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    signal: SignalPayload,
    #[serde(flatten)]
    config: AnalysisConfig,
}

#[derive(Debug, Serialize)]
pub struct DominantResponse {
    frequency: f64,
    bin: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    profile: CyclicProfile,
    alpha_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    generation: u64,
}

async fn spectrum(Json(req): Json<SignalRequest>) -> ApiResult<Spectrum> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        Ok(compute_spectrum(&signal)?)
    })
    .await
}

async fn dominant(Json(req): Json<SignalRequest>) -> ApiResult<DominantResponse> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        Ok(DominantResponse {
            frequency: dominant_frequency(&signal)?,
            bin: dominant_bin(&signal)?,
        })
    })
    .await
}

async fn caf(Json(req): Json<CafRequest>) -> ApiResult<CafSequence> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        Ok(cyclic_autocorrelation(&signal, req.alpha, req.max_lag)?)
    })
    .await
}

async fn scf(Json(req): Json<ScfRequest>) -> ApiResult<ScfSlice> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        let caf = cyclic_autocorrelation(&signal, req.alpha, req.max_lag)?;
        let options = ScfOptions {
            n_freq: req.n_freq,
            centered: req.centered,
            scaling: req.scaling,
        };
        Ok(spectral_correlation(&caf, sample_rate, options)?)
    })
    .await
}

async fn profile(Json(req): Json<ProfileRequest>) -> ApiResult<ProfileResponse> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        let target_frequency = match req.target_frequency {
            Some(f0) => f0,
            None => dominant_frequency(&signal)?,
        };
        let params = ProfileParams {
            max_lag: req.max_lag,
            n_alpha: req.n_alpha,
            n_freq: req.n_freq,
            target_frequency,
            span: req.span,
            scaling: req.scaling,
        };
        let profile = cyclic_profile(&signal, &params)?;
        let alpha_index = req
            .alpha
            .and_then(|alpha| nearest_alpha_index(&profile.alphas, alpha));
        Ok(ProfileResponse {
            profile,
            alpha_index,
        })
    })
    .await
}

async fn surface(Json(req): Json<SurfaceRequest>) -> ApiResult<ScfSurface> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        let params = SurfaceParams {
            max_lag: req.max_lag,
            n_alpha: req.n_alpha,
            n_freq: req.n_freq,
            scaling: req.scaling,
        };
        Ok(scf_surface(&signal, &params)?)
    })
    .await
}

async fn analysis(Json(req): Json<AnalyzeRequest>) -> ApiResult<Analysis> {
    compute(move || {
        let (samples, sample_rate) = req.signal.into_samples()?;
        let signal = Signal::new(&samples, sample_rate)?;
        Ok(analyze(&signal, &req.config)?)
    })
    .await
}

async fn submit_live(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> std::result::Result<(StatusCode, Json<SubmittedResponse>), ApiError> {
    let (samples, sample_rate) = req.signal.into_samples()?;
    let generation = state.live.submit(samples, sample_rate, req.config);
    Ok((StatusCode::ACCEPTED, Json(SubmittedResponse { generation })))
}

async fn latest_live(State(state): State<AppState>) -> Response {
    match state.live.latest() {
        Some(result) => Json(result.as_ref().clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
