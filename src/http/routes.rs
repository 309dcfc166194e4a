use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::analysis::HumCandidate;
use crate::audio::{decode_wav, encode_wav, AudioBuffer};
use crate::config::{AppConfig, ProcessingConfig};
use crate::engine::{HumRemover, ProcessingRequest, ProcessingSummary, TargetFrequency};
use crate::error::{log_codec_error, log_dsp_error, DspError, ErrorCode};

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct HumHttpState {
    remover: Arc<HumRemover>,
    defaults: ProcessingConfig,
    max_upload_bytes: usize,
}

impl HumHttpState {
    pub fn new(remover: HumRemover, defaults: ProcessingConfig, max_upload_bytes: usize) -> Self {
        Self {
            remover: Arc::new(remover),
            defaults,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            HumRemover::from_config(&config.detection),
            config.processing.clone(),
            config.server.max_upload_bytes,
        )
    }

    /// Merge query overrides onto the configured defaults
    ///
    /// Explicit frequencies are limited to the detector's candidates.
    fn request_from(&self, query: &ProcessQuery) -> Result<ProcessingRequest, HttpServerError> {
        let target = match query.hum_frequency.as_deref() {
            Some(raw) => {
                let target: TargetFrequency =
                    raw.parse().map_err(|_| self.unsupported_frequency())?;
                if let TargetFrequency::Explicit(hz) = target {
                    if !self.remover.detector().candidates().contains(&hz) {
                        return Err(self.unsupported_frequency());
                    }
                }
                target
            }
            None => self.defaults.target,
        };

        let harmonic_count = self
            .defaults
            .check_harmonics(query.harmonics.unwrap_or(self.defaults.harmonic_count))
            .map_err(HttpServerError::BadRequest)?;

        let quality_factor = query.quality_factor.unwrap_or(self.defaults.quality_factor);
        if !quality_factor.is_finite() || quality_factor <= 0.0 {
            return Err(HttpServerError::BadRequest(
                "qualityFactor must be a positive number".to_string(),
            ));
        }

        Ok(ProcessingRequest {
            target,
            harmonic_count,
            quality_factor,
        })
    }

    fn unsupported_frequency(&self) -> HttpServerError {
        let allowed = self
            .remover
            .detector()
            .candidates()
            .iter()
            .map(|hz| hz.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        HttpServerError::BadRequest(format!(
            "Hum frequency must be one of {allowed} or \"auto\""
        ))
    }
}

/// Query parameters accepted by `/api/process-audio`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessQuery {
    pub hum_frequency: Option<String>,
    pub harmonics: Option<u32>,
    pub quality_factor: Option<f64>,
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    BadRequest(String),
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<DspError> for HttpServerError {
    fn from(err: DspError) -> Self {
        log_dsp_error(&err, "http");
        match err {
            DspError::EmptyBuffer | DspError::InsufficientData => {
                Self::Unprocessable(err.message())
            }
            DspError::InvalidBuffer { .. } => Self::BadRequest(err.message()),
            _ => Self::Internal(format!("[{}] {}", err.code(), err.message())),
        }
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Detection endpoint response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub frequency: f64,
    pub score: f64,
    pub confident: bool,
    pub candidates: Vec<HumCandidate>,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: HumHttpState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(health))
        .route("/api/process-audio", post(process_audio))
        .route("/api/detect-hum", post(detect_hum))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the HTTP server loop until Ctrl-C.
pub async fn run_http_server(state: HumHttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {addr}"))?;
    tracing::info!(%addr, "hum removal API listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP router")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down HTTP server");
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Hum remover API is running",
    })
}

pub async fn process_audio(
    State(state): State<HumHttpState>,
    Query(query): Query<ProcessQuery>,
    body: Bytes,
) -> Result<Response, HttpServerError> {
    let request = state.request_from(&query)?;
    let buffer = decode_body(&body)?;
    tracing::debug!(
        target_frequency = %request.target,
        harmonics = request.harmonic_count,
        frames = buffer.frames(),
        "process-audio request"
    );

    let remover = Arc::clone(&state.remover);
    let (summary, wav) = tokio::task::spawn_blocking(move || {
        let result = remover.remove_hum(buffer, &request)?;
        let wav = encode_wav(&result.buffer).map_err(|err| {
            log_codec_error(&err, "process-audio");
            HttpServerError::Internal(err.message())
        })?;
        Ok::<_, HttpServerError>((result.summary(), wav))
    })
    .await
    .map_err(|err| HttpServerError::Internal(format!("processing task failed: {err}")))??;

    tracing::info!(
        frequency = summary.resolved_frequency,
        auto_detected = summary.auto_detected,
        applied = summary.harmonics_applied.len(),
        skipped = summary.harmonics_skipped.len(),
        "{}",
        summary.message
    );

    let mut response = (StatusCode::OK, wav).into_response();
    insert_summary_headers(response.headers_mut(), &summary)?;
    Ok(response)
}

pub async fn detect_hum(
    State(state): State<HumHttpState>,
    body: Bytes,
) -> Result<Json<DetectResponse>, HttpServerError> {
    let buffer = decode_body(&body)?;

    let remover = Arc::clone(&state.remover);
    let response = tokio::task::spawn_blocking(move || {
        let detection = remover.detect(&buffer)?;
        Ok::<_, HttpServerError>(DetectResponse {
            frequency: detection.best.frequency,
            score: detection.best.score,
            confident: detection.best.confident,
            candidates: detection.candidates,
            sample_rate: buffer.sample_rate(),
            channels: buffer.channel_count(),
            frames: buffer.frames(),
        })
    })
    .await
    .map_err(|err| HttpServerError::Internal(format!("detection task failed: {err}")))??;

    tracing::info!(
        frequency = response.frequency,
        score = response.score,
        confident = response.confident,
        "detect-hum request"
    );
    Ok(Json(response))
}

fn decode_body(body: &[u8]) -> Result<AudioBuffer, HttpServerError> {
    if body.is_empty() {
        return Err(HttpServerError::BadRequest("No file uploaded".to_string()));
    }

    decode_wav(body).map_err(|err| {
        log_codec_error(&err, "http upload");
        HttpServerError::BadRequest(format!("Could not decode audio: {}", err.message()))
    })
}

fn insert_summary_headers(
    headers: &mut HeaderMap,
    summary: &ProcessingSummary,
) -> Result<(), HttpServerError> {
    let applied = summary
        .harmonics_applied
        .iter()
        .map(|hz| hz.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut pairs = vec![
        ("x-hum-frequency", summary.resolved_frequency.to_string()),
        ("x-auto-detected", summary.auto_detected.to_string()),
        ("x-harmonics-applied", applied),
        ("x-hum-message", summary.message.clone()),
    ];
    if let Some(confident) = summary.detection_confident {
        pairs.push(("x-hum-confident", confident.to_string()));
    }
    if let Some(detected) = summary.detected_frequency {
        pairs.push(("x-detected-frequency", detected.to_string()));
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    for (name, value) in pairs {
        let value = HeaderValue::from_str(&value)
            .map_err(|err| HttpServerError::Internal(format!("invalid header {name}: {err}")))?;
        headers.insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::testing::SyntheticHum;

    fn make_router() -> Router {
        build_router(HumHttpState::from_config(&AppConfig::default()))
    }

    fn hum_wav(fundamental: f64) -> Vec<u8> {
        let buffer = SyntheticHum {
            fundamental,
            ..SyntheticHum::default()
        }
        .render(16_000, 2.0, 1)
        .expect("render synthetic hum");
        encode_wav(&buffer).expect("encode wav")
    }

    fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "audio/wav")
            .body(Body::from(body))
            .expect("post request")
    }

    async fn response_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        let json = serde_json::from_slice::<Value>(&bytes).expect("JSON body");
        (status, json)
    }

    fn header<'a>(response: &'a Response, name: &str) -> &'a str {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, json) = response_json(
            make_router()
                .oneshot(
                    Request::builder()
                        .uri("/api/health")
                        .body(Body::empty())
                        .expect("health request"),
                )
                .await
                .expect("health call"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn process_audio_auto_detects_and_returns_wav() {
        let response = make_router()
            .oneshot(post(
                "/api/process-audio?humFrequency=auto&harmonics=3",
                hum_wav(50.0),
            ))
            .await
            .expect("process call");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-type"), "audio/wav");
        assert_eq!(header(&response, "x-hum-frequency"), "50");
        assert_eq!(header(&response, "x-detected-frequency"), "50");
        assert_eq!(header(&response, "x-auto-detected"), "true");
        assert_eq!(header(&response, "x-hum-confident"), "true");
        assert_eq!(header(&response, "x-harmonics-applied"), "50,100,150");
        assert_eq!(
            header(&response, "x-hum-message"),
            "Auto-detected and removed 50 Hz hum and harmonics"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("wav body");
        let cleaned = decode_wav(&bytes).expect("decode cleaned wav");
        assert_eq!(cleaned.sample_rate(), 16_000);
        assert_eq!(cleaned.frames(), 32_000);
    }

    #[tokio::test]
    async fn process_audio_explicit_frequency() {
        let response = make_router()
            .oneshot(post("/api/process-audio?humFrequency=60", hum_wav(60.0)))
            .await
            .expect("process call");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-auto-detected"), "false");
        assert!(response.headers().get("x-detected-frequency").is_none());
        assert_eq!(
            header(&response, "x-harmonics-applied"),
            "60,120,180,240,300"
        );
    }

    #[tokio::test]
    async fn process_audio_rejects_unsupported_frequency() {
        let (status, json) = response_json(
            make_router()
                .oneshot(post("/api/process-audio?humFrequency=55", hum_wav(60.0)))
                .await
                .expect("process call"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]
            .as_str()
            .unwrap_or_default()
            .contains("Hum frequency must be one of 50, 60"));
    }

    #[tokio::test]
    async fn process_audio_reports_low_confidence_detection() {
        let buffer = SyntheticHum {
            harmonic_amplitudes: Vec::new(),
            ..SyntheticHum::default()
        }
        .render(16_000, 2.0, 1)
        .expect("render hum-free signal");
        let response = make_router()
            .oneshot(post(
                "/api/process-audio?humFrequency=auto",
                encode_wav(&buffer).expect("encode wav"),
            ))
            .await
            .expect("process call");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-auto-detected"), "true");
        assert_eq!(header(&response, "x-hum-confident"), "false");
        assert!(response.headers().get("x-detected-frequency").is_none());
        assert!(header(&response, "x-hum-message").starts_with("No hum detected"));
    }

    #[tokio::test]
    async fn process_audio_rejects_out_of_range_harmonics() {
        for harmonics in ["0", "6", "4294967295"] {
            let (status, json) = response_json(
                make_router()
                    .oneshot(post(
                        &format!("/api/process-audio?harmonics={harmonics}"),
                        hum_wav(60.0),
                    ))
                    .await
                    .expect("process call"),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "harmonics={harmonics}");
            assert!(json["error"]
                .as_str()
                .unwrap_or_default()
                .contains("harmonics must be between 1 and 5"));
        }
    }

    #[tokio::test]
    async fn process_audio_rejects_missing_and_garbage_bodies() {
        let (status, json) = response_json(
            make_router()
                .oneshot(post("/api/process-audio", Vec::new()))
                .await
                .expect("process call"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file uploaded");

        let (status, _) = response_json(
            make_router()
                .oneshot(post("/api/process-audio", b"definitely not a wav".to_vec()))
                .await
                .expect("process call"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn process_audio_rejects_empty_audio() {
        let empty = AudioBuffer::new(vec![Vec::new()], 8_000).expect("empty buffer");
        let (status, json) = response_json(
            make_router()
                .oneshot(post("/api/process-audio", encode_wav(&empty).expect("wav")))
                .await
                .expect("process call"),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let state = HumHttpState::new(HumRemover::default(), ProcessingConfig::default(), 1024);
        let response = build_router(state)
            .oneshot(post("/api/process-audio", hum_wav(60.0)))
            .await
            .expect("process call");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn detect_hum_returns_candidate_scores() {
        let (status, json) = response_json(
            make_router()
                .oneshot(post("/api/detect-hum", hum_wav(60.0)))
                .await
                .expect("detect call"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["frequency"], 60.0);
        assert_eq!(json["confident"], true);
        assert_eq!(json["candidates"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["sampleRate"], 16_000);
    }
}
