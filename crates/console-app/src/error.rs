//! Error types for the app service layer.
//!
//! Decorators never translate a [`ServiceError`]; whatever the store
//! returns reaches the caller as-is.

/// Errors that can occur in an [`AppService`](crate::AppService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An id could not be represented in the store's numeric range.
    #[error("Invalid id: {0}")]
    InvalidId(String),
}
