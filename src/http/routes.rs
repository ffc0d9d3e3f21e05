use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::api::{MotionMetrics, TrackerSnapshot};
use crate::engine::{TelemetryEvent, TrackerHandle};
use crate::error::ErrorCode;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct DebugHttpState {
    pub handle: &'static TrackerHandle,
    token: Arc<String>,
}

impl DebugHttpState {
    pub fn new(handle: &'static TrackerHandle, token: String) -> Self {
        Self {
            handle,
            token: Arc::new(token),
        }
    }

    fn authorize(
        &self,
        headers: &HeaderMap,
        query_token: Option<&str>,
    ) -> Result<(), HttpServerError> {
        let provided = extract_token(headers, query_token);
        match provided {
            Some(value) if value == *self.token => Ok(()),
            _ => Err(HttpServerError::Unauthorized),
        }
    }
}

/// Query payload for extracting token from URL.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    pub token: Option<String>,
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    Unauthorized,
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "missing or invalid token".into()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<crate::error::TrackerError> for HttpServerError {
    fn from(err: crate::error::TrackerError) -> Self {
        Self::Internal(format!("code {}: {}", err.code(), err.message()))
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tracking: bool,
    pub sensor_available: bool,
    pub uptime_ms: u64,
}

/// Metrics endpoint response payload.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub latest_motion_metrics: Option<MotionMetrics>,
    pub latest_telemetry: Option<TelemetryEvent>,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: DebugHttpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(state_snapshot))
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

/// Run the HTTP server loop.
pub async fn run_http_server(state: DebugHttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding debug HTTP listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .await
        .context("serving debug HTTP router")?;
    Ok(())
}

pub async fn health(
    State(state): State<DebugHttpState>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<HealthResponse>, HttpServerError> {
    state.authorize(&headers, query.token.as_deref())?;

    Ok(Json(HealthResponse {
        status: "ok",
        tracking: state.handle.is_tracking(),
        sensor_available: state.handle.is_sensor_available(),
        uptime_ms: state.handle.uptime_ms(),
    }))
}

pub async fn state_snapshot(
    State(state): State<DebugHttpState>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<TrackerSnapshot>, HttpServerError> {
    state.authorize(&headers, query.token.as_deref())?;

    let snapshot = state.handle.snapshot()?;
    Ok(Json(snapshot))
}

pub async fn metrics(
    State(state): State<DebugHttpState>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<MetricsResponse>, HttpServerError> {
    state.authorize(&headers, query.token.as_deref())?;

    let latest_motion_metrics = state
        .handle
        .broadcasts
        .subscribe_motion_metrics()
        .and_then(|mut rx| drain_broadcast(&mut rx));

    let latest_telemetry = {
        let mut telemetry_rx = state.handle.telemetry_receiver();
        drain_broadcast(&mut telemetry_rx)
    };

    Ok(Json(MetricsResponse {
        latest_motion_metrics,
        latest_telemetry,
    }))
}

pub async fn reset(
    State(state): State<DebugHttpState>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
) -> Result<Json<TrackerSnapshot>, HttpServerError> {
    state.authorize(&headers, query.token.as_deref())?;

    let snapshot = state.handle.reset_steps()?;
    Ok(Json(snapshot))
}

fn extract_token(headers: &HeaderMap, query_token: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }
    query_token.map(|t| t.to_string())
}

fn drain_broadcast<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Option<T> {
    let mut latest = None;
    loop {
        match rx.try_recv() {
            Ok(value) => latest = Some(value),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer secret".parse().unwrap());

        assert_eq!(
            extract_token(&headers, Some("other")),
            Some("secret".to_string())
        );
    }

    #[test]
    fn test_extract_token_falls_back_to_query() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_token(&headers, Some("from-query")),
            Some("from-query".to_string())
        );
        assert_eq!(extract_token(&headers, None), None);
    }
}
