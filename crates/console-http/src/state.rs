//! Shared state for the app handlers.

use std::time::Duration;

use console_core::AppCore;

/// Default artificial latency applied to successful list and fetch responses.
pub const DEFAULT_READ_DELAY: Duration = Duration::from_secs(1);

/// Default deadline for receiving a request body.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Default maximum accepted request body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// State injected into the app handlers via Axum's `State` extractor.
///
/// Wrapped in [`Arc`](std::sync::Arc); the core is built once at startup
/// and shared by every request.
pub struct AppState<S> {
    /// Core operations over the decorated app service.
    pub apps: AppCore<S>,
    /// Delay applied before answering a successful list or fetch.
    pub read_delay: Duration,
    /// Deadline for reading a request body.
    pub read_timeout: Duration,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl<S> AppState<S> {
    /// State with the default delay, timeout and body limit.
    pub const fn new(apps: AppCore<S>) -> Self {
        Self {
            apps,
            read_delay: DEFAULT_READ_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the artificial read latency.
    #[must_use]
    pub const fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Override the body read deadline.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Override the body size limit.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}
