//! HTTP surface of the administrative console.
//!
//! This crate adapts [`AppCore`](console_core::AppCore) operations into
//! Axum handlers and wraps them with the console's middleware chain:
//!
//! - **API** (`/api/apps`, `/api/apps/{id}`) behind the [`Chain`]
//! - **Console UI**: static assets and the shell page
//! - **Telemetry**: Prometheus scrape endpoint on a separate listener
//!
//! # Request flow
//!
//! ```text
//! request -> Chain (ctx, log, instrument, headers, cors, user-agent)
//!         -> handler -> AppCore -> LogService -> InstrumentService -> store
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payload;
pub mod router;
pub mod server;
pub mod shell;
pub mod state;
pub mod telemetry;

// Re-export primary types for convenience.
pub use error::HttpError;
pub use middleware::{Chain, ChainConfig, ChainError, RequestContext, Step};
pub use router::{api_router, build_router, console_router};
pub use server::{ServerConfig, ServerError, spawn_telemetry, start_server, with_write_timeout};
pub use shell::Shell;
pub use state::AppState;
