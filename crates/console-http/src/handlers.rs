//! App endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/apps/{id}` | Fetch one enabled app |
//! | `GET` | `/api/apps` | List all apps, `204` when there are none |
//! | `POST` | `/api/apps` | Create an app |
//!
//! Successful list and fetch responses are held back by the configured
//! read delay before they are sent.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use console_app::AppService;

use crate::error::HttpError;
use crate::payload::{AppPayload, AppsPayload, CreateAppRequest};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /api/apps -- create
// ---------------------------------------------------------------------------

/// Create an app from `{"name": ..., "description": ...}`.
pub async fn create_app<S: AppService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Body,
) -> Result<Response, HttpError> {
    let bytes = read_body(body, state.max_body_bytes, state.read_timeout).await?;

    let request: CreateAppRequest =
        serde_json::from_slice(&bytes).map_err(|e| HttpError::BadRequest(e.to_string()))?;

    let app = state
        .apps
        .create(&request.name, &request.description)
        .await?;

    Ok((StatusCode::OK, Json(AppPayload::from(app))).into_response())
}

// ---------------------------------------------------------------------------
// GET /api/apps -- list
// ---------------------------------------------------------------------------

/// List every app in the namespace.
pub async fn list_apps<S: AppService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Response, HttpError> {
    let apps = state.apps.list().await?;

    if apps.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    tokio::time::sleep(state.read_delay).await;

    Ok((StatusCode::OK, Json(AppsPayload::from(apps))).into_response())
}

// ---------------------------------------------------------------------------
// GET /api/apps/{id} -- fetch
// ---------------------------------------------------------------------------

/// Return the enabled app with the id in the path.
pub async fn retrieve_app<S: AppService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id_str): Path<String>,
) -> Result<Response, HttpError> {
    let id = parse_app_id(&id_str)?;

    let app = state.apps.fetch(id).await?;

    tokio::time::sleep(state.read_delay).await;

    Ok((StatusCode::OK, Json(AppPayload::from(app))).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an app id from a path segment.
fn parse_app_id(s: &str) -> Result<u64, HttpError> {
    s.parse::<u64>()
        .map_err(|e| HttpError::BadRequest(format!("invalid app id {s}: {e}")))
}

/// Collect a request body, bounded in size and time.
async fn read_body(body: Body, limit: usize, timeout: Duration) -> Result<Bytes, HttpError> {
    match tokio::time::timeout(timeout, axum::body::to_bytes(body, limit)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(HttpError::BadRequest(format!("failed to read body: {e}"))),
        Err(_) => Err(HttpError::Timeout(format!(
            "body not received within {}ms",
            timeout.as_millis()
        ))),
    }
}
