//! Console HTTP server lifecycle management.
//!
//! [`start_server`] binds the API listener and serves until `Ctrl-C`.
//! [`spawn_telemetry`] runs the `/metrics` listener on a background task.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::telemetry::telemetry_router;

/// Configuration for the console API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:8084`.
    pub listen_addr: String,
    /// Requests taking longer than this are answered with `408`.
    pub write_timeout: Duration,
}

/// Errors that can occur when starting or running a server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Bind `addr` and return the listener.
async fn bind(addr: &str) -> Result<(TcpListener, SocketAddr), ServerError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {addr}: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    Ok((listener, addr))
}

/// Answer `408` for any request still running after `timeout`.
pub fn with_write_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        timeout,
    ))
}

/// Serve `router` on the configured address until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, router: Router) -> Result<(), ServerError> {
    let (listener, addr) = bind(&config.listen_addr).await?;

    let router = with_write_timeout(router, config.write_timeout);

    info!(%addr, lifecycle = "start", sub = "api", "Console server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!(lifecycle = "stop", sub = "api", "Console server stopped");

    Ok(())
}

/// Spawn the telemetry server on a background Tokio task.
///
/// The address is bound before the task is spawned so misconfiguration is
/// reported to the caller.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or in use.
pub async fn spawn_telemetry(addr: &str, registry: Registry) -> Result<JoinHandle<()>, ServerError> {
    let (listener, addr) = bind(addr).await?;
    let router = telemetry_router(registry);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, lifecycle = "abort", sub = "telemetry", "Telemetry server exited with error");
        }
    });

    info!(%addr, lifecycle = "start", sub = "telemetry", "Telemetry server listening");

    Ok(handle)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
