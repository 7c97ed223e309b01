//! Administrative console backend binary.
//!
//! Loads configuration, installs structured logging, connects the app
//! store, assembles the service decorators and the middleware chain, and
//! serves the console until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `console-config.yaml` (or `CONSOLE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Register service and handler metrics
//! 4. Connect the store and run migrations
//! 5. Wrap the store: `LogService -> InstrumentService -> store`
//! 6. Build the middleware chain and router
//! 7. Start the telemetry listener, then serve the API
//! 8. Close the store on shutdown

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use console_app::metrics::{
    FIELD_COMPONENT, FIELD_METHOD, FIELD_NAMESPACE, FIELD_ROUTE, FIELD_STORE,
};
use console_app::{
    AppStore, InstrumentService, KeyMetrics, LogService, MemoryService, NAMESPACE_DEFAULT,
    PostgresConfig, PostgresService, StoreKind,
};
use console_core::AppCore;
use console_http::{
    AppState, Chain, ChainConfig, ServerConfig, Shell, build_router, spawn_telemetry,
    start_server,
};
use prometheus::Registry;
use tracing::{Span, info};
use tracing_subscriber::EnvFilter;

use crate::config::{
    CONFIG_PATH_VAR, ConfigSource, ConsoleConfig, DEFAULT_CONFIG_PATH, LoggingConfig, StoreConfig,
};
use crate::error::ConsoleError;

/// Component label for metrics and the root span.
const COMPONENT: &str = "console";

/// API version attached to every request context.
const API_VERSION: &str = "0.4";

/// Build revision, set at compile time through `CONSOLE_REVISION`.
const REVISION: &str = match option_env!("CONSOLE_REVISION") {
    Some(revision) => revision,
    None => "0000000-dev",
};

/// Host name used when none can be determined.
const UNKNOWN_HOST: &str = "unknown";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server fails.
#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    let begin = Instant::now();

    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;

    let host = hostname();
    let span = tracing::info_span!(
        "console",
        component = COMPONENT,
        revision = REVISION,
        host = host.as_str()
    );
    info!(parent: &span, source = source.as_str(), "Configuration loaded");

    if let Err(e) = run(&config, &host, &span, begin).await {
        tracing::error!(parent: &span, error = %e, lifecycle = "abort", "Console aborted");
        return Err(e);
    }

    Ok(())
}

async fn run(
    config: &ConsoleConfig,
    host: &str,
    span: &Span,
    begin: Instant,
) -> Result<(), ConsoleError> {
    // 3. Register metrics.
    let registry = Registry::new();
    let service_metrics = Arc::new(KeyMetrics::new(
        &registry,
        "service",
        &[FIELD_COMPONENT, FIELD_METHOD, FIELD_NAMESPACE, FIELD_STORE],
    )?);
    let handler_metrics = Arc::new(KeyMetrics::new(
        &registry,
        "handler",
        &[FIELD_COMPONENT, FIELD_ROUTE, FIELD_METHOD],
    )?);

    // 4. Connect the store.
    let store = Arc::new(connect_store(&config.store).await?);
    let kind = store.kind();
    info!(parent: span, store = kind.as_str(), "Store ready");

    // 5. Decorate it.
    let apps = LogService::new(
        InstrumentService::new(
            Arc::clone(&store),
            COMPONENT,
            kind.as_str(),
            service_metrics,
        ),
        kind.as_str(),
        span.clone(),
    );
    let core = AppCore::new(Arc::new(apps), NAMESPACE_DEFAULT);
    let state = Arc::new(
        AppState::new(core)
            .with_read_delay(config.server.read_delay())
            .with_read_timeout(config.server.read_timeout())
            .with_max_body_bytes(config.server.max_body_bytes),
    );

    // 6. Chain and router.
    let chain = Chain::with_constraints(ChainConfig {
        version: API_VERSION.to_owned(),
        component: COMPONENT.to_owned(),
        revision: REVISION.to_owned(),
        hostname: host.to_owned(),
        span: span.clone(),
        recorder: handler_metrics,
    })?;
    info!(parent: span, steps = ?chain.names(), "Middleware chain built");

    let shell = Arc::new(Shell::new(&config.deployment.zone())?);
    let router = build_router(
        state,
        &chain,
        Path::new(&config.server.assets_dir),
        shell,
    );

    // 7. Listeners.
    let _telemetry = spawn_telemetry(&config.server.telemetry_addr, registry).await?;

    let server_config = ServerConfig {
        listen_addr: config.server.listen_addr.clone(),
        write_timeout: config.server.write_timeout(),
    };

    info!(
        parent: span,
        lifecycle = "start",
        sub = "api",
        listen_addr = server_config.listen_addr.as_str(),
        zone = %config.deployment.zone(),
        duration_ms = u64::try_from(begin.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Console started"
    );

    let served = start_server(&server_config, router).await;

    // 8. Shut down.
    store.close().await;
    info!(parent: span, lifecycle = "stop", "Console stopped");

    served?;

    Ok(())
}

/// Load configuration from the configured path, then apply environment
/// overrides.
fn load_config() -> Result<(ConsoleConfig, ConfigSource), ConsoleError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());

    let (mut config, source) = ConsoleConfig::load(Path::new(&path))?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    Ok((config, source))
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(config: &LoggingConfig) -> Result<(), ConsoleError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| ConsoleError::Logging {
            message: format!("invalid level {:?}: {e}", config.level),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

async fn connect_store(config: &StoreConfig) -> Result<AppStore, ConsoleError> {
    match config.kind {
        StoreKind::Memory => Ok(AppStore::Memory(MemoryService::new())),
        StoreKind::Postgres => {
            let pg = PostgresService::connect(
                &PostgresConfig::new(&config.postgres_url)
                    .with_max_connections(config.max_connections),
            )
            .await?;
            if config.run_migrations {
                pg.run_migrations().await?;
            }
            Ok(AppStore::Postgres(pg))
        }
    }
}

/// The serving host: `HOSTNAME`, then `/etc/hostname`, then `unknown`.
fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_owned())
}
