// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`:
//
//   GET  /api/v1/health           liveness + counters
//   GET  /api/v1/params/defaults  the AnalysisParams applied when omitted
//   POST /api/v1/analyze          run the engine on a posted series
//
// The engine is CPU-bound, so each analysis runs on the blocking pool.
// Validation failures map to 400 `{ "error": ... }`; a failed worker maps
// to 500.
//
// CORS is configured permissively for development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::app_state::AppState;
use crate::cache::fingerprint;
use crate::engine::{analyze, AnalysisParams};
use crate::envelope::AnalysisEnvelope;
use crate::scoring::MarketInputs;
use crate::series::{Sample, TimeSeries, VolumeSeries};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/params/defaults", get(default_params))
        .route("/api/v1/analyze", post(analyze_series))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    analyses_served: u64,
    cache_entries: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        analyses_served: state.analyses_served(),
        cache_entries: state.cache.len(),
    };
    Json(resp)
}

// =============================================================================
// Default parameters
// =============================================================================

async fn default_params(State(state): State<Arc<AppState>>) -> Json<AnalysisParams> {
    Json(state.config.analysis.clone())
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    symbol: Option<String>,
    samples: Vec<Sample>,
    #[serde(default)]
    volumes: Option<Vec<f64>>,
    #[serde(default)]
    market: MarketInputs,
    #[serde(default)]
    params: Option<AnalysisParams>,
}

async fn analyze_series(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisEnvelope>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "malformed analyze request");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let AnalyzeRequest {
        symbol,
        samples,
        volumes,
        market,
        params,
    } = req;
    let params = params.unwrap_or_else(|| state.config.analysis.clone());
    let key = fingerprint(&samples, volumes.as_deref(), &market, &params);
    let sample_count = samples.len();

    let worker_state = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        worker_state.cache.get_or_compute(key, move || {
            let series = TimeSeries::new(samples)?;
            let volumes = volumes.map(VolumeSeries::new).transpose()?;
            analyze(&series, volumes.as_ref(), &market, &params)
        })
    })
    .await;

    match outcome {
        Ok(Ok((report, cached))) => {
            let served = state.record_served();
            info!(
                symbol = symbol.as_deref().unwrap_or("-"),
                samples = sample_count,
                direction = %report.prediction.direction,
                cached,
                served,
                "analysis served"
            );
            Ok(Json(AnalysisEnvelope::new(symbol, report, cached)))
        }
        Ok(Err(e)) => {
            warn!(symbol = symbol.as_deref().unwrap_or("-"), error = %e, "analysis rejected");
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            error!(error = %e, "analysis worker failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "analysis worker failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(ServiceConfig::default()));
        (router(Arc::clone(&state)), state)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn uptrend_samples(n: i64) -> serde_json::Value {
        let samples: Vec<serde_json::Value> = (0..n)
            .map(|i| serde_json::json!({ "timestamp": i * 60_000, "price": 100.0 + i as f64 }))
            .collect();
        serde_json::Value::Array(samples)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let req = Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["analyses_served"], 0);
        assert!(json["server_time"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn defaults_endpoint_returns_params() {
        let (app, _) = app();
        let req = Request::builder()
            .uri("/api/v1/params/defaults")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rsi_period"], 14);
        assert_eq!(json["sma_periods"], serde_json::json!([20, 50]));
    }

    #[tokio::test]
    async fn analyze_uptrend_then_hit_cache() {
        let (app, state) = app();
        let body = serde_json::json!({ "symbol": "BTCUSDT", "samples": uptrend_samples(100) });

        let (status, first) = send(&app, post_json(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["symbol"], "BTCUSDT");
        assert_eq!(first["cached"], false);
        assert_eq!(first["report"]["as_of"], 99 * 60_000);
        assert_eq!(first["report"]["momentum"]["rsi"], 100.0);
        assert_eq!(first["report"]["pattern"]["trend_label"], "bullish_impulse");
        assert_eq!(first["report"]["prediction"]["direction"], "BULLISH");

        let (status, second) = send(&app, post_json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);
        assert_ne!(first["id"], second["id"]);
        assert_eq!(state.analyses_served(), 2);
    }

    #[tokio::test]
    async fn request_params_override_defaults() {
        let (app, _) = app();
        let body = serde_json::json!({
            "samples": uptrend_samples(19),
            "params": { "sma_periods": [20] }
        });
        let (status, json) = send(&app, post_json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["report"]["trend"]["sma"]["20"].is_null());
        assert!(json.get("symbol").is_none());
    }

    #[tokio::test]
    async fn empty_series_is_bad_request() {
        let (app, state) = app();
        let (status, json) = send(&app, post_json(serde_json::json!({ "samples": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("empty"));
        assert_eq!(state.analyses_served(), 0);
    }

    #[tokio::test]
    async fn invalid_inputs_are_bad_requests() {
        let (app, _) = app();

        let negative = serde_json::json!({ "samples": [{ "timestamp": 0, "price": -1.0 }] });
        let (status, _) = send(&app, post_json(negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mismatch = serde_json::json!({ "samples": uptrend_samples(5), "volumes": [1.0, 2.0] });
        let (status, json) = send(&app, post_json(mismatch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("does not match"));

        let weights = serde_json::json!({
            "samples": uptrend_samples(5),
            "params": { "weights": { "technical": 0.3 } }
        });
        let (status, _) = send(&app, post_json(weights)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (app, _) = app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}
