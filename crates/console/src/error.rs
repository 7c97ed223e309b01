//! Error types for the console binary.
//!
//! [`ConsoleError`] wraps every failure mode of startup and serving so
//! `main` can propagate with `?`.

use console_app::ServiceError;
use console_app::metrics::MetricsError;
use console_http::{ChainError, ServerError};

use crate::config::ConfigError;

/// Top-level error for the console binary.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The log filter could not be built.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },

    /// Metric registration failed.
    #[error("metrics error: {source}")]
    Metrics {
        /// The underlying metrics error.
        #[from]
        source: MetricsError,
    },

    /// Connecting to or migrating the store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: ServiceError,
    },

    /// The middleware chain could not be built.
    #[error("chain error: {source}")]
    Chain {
        /// The underlying chain error.
        #[from]
        source: ChainError,
    },

    /// The console page template failed to compile.
    #[error("template error: {source}")]
    Template {
        /// The underlying template error.
        #[from]
        source: minijinja::Error,
    },

    /// A listener failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}
