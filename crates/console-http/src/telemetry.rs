//! Prometheus scrape endpoint.
//!
//! Served on its own listener so the API chain never sees scrape traffic.

use axum::Router;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, Registry, TextEncoder};

use crate::error::HttpError;

/// Build the telemetry router exposing `GET /metrics`.
pub fn telemetry_router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(registry)
}

async fn metrics(State(registry): State<Registry>) -> Result<Response, HttpError> {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buf)
        .map_err(|e| HttpError::Internal(format!("failed to encode metrics: {e}")))?;

    Ok(([(CONTENT_TYPE, encoder.format_type().to_owned())], buf).into_response())
}
