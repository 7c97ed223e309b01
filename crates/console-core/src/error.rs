//! Error types for core operations.

use console_app::ServiceError;

/// The random source backing token generation could not be read.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Seeding from the operating system entropy source failed.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

/// Errors returned by [`AppCore`](crate::AppCore) operations.
///
/// Only the not-found case is produced here; store and token errors are
/// carried through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No enabled app matched the requested id.
    #[error("app ({id}) not found")]
    NotFound {
        /// The id that was requested.
        id: u64,
    },

    /// The app service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Token generation failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}
