//! Structured logging decorator.
//!
//! [`LogService`] emits one event per delegated call with `method`,
//! `store` and `duration_ns`, plus `err` when the call failed. Events are
//! parented to the span handed in at construction, so the caller decides
//! which fields (component, revision, host) every record carries.

use std::time::Instant;

use tracing::Span;

use crate::error::ServiceError;
use crate::model::{App, AppDraft, QueryOptions};
use crate::service::{AppService, Method};

/// Wraps an [`AppService`] and logs every call.
pub struct LogService<S> {
    next: S,
    store: String,
    span: Span,
}

impl<S: AppService> LogService<S> {
    /// Decorate `next`, logging under `span` with the given store kind.
    pub fn new(next: S, store: &str, span: Span) -> Self {
        Self {
            next,
            store: store.to_owned(),
            span,
        }
    }

    fn record(&self, method: Method, begin: Instant, err: Option<&ServiceError>) {
        let duration_ns = u64::try_from(begin.elapsed().as_nanos()).unwrap_or(u64::MAX);

        match err {
            Some(err) => tracing::warn!(
                parent: &self.span,
                method = method.as_str(),
                store = self.store.as_str(),
                duration_ns,
                err = %err,
                "service call failed"
            ),
            None => tracing::info!(
                parent: &self.span,
                method = method.as_str(),
                store = self.store.as_str(),
                duration_ns,
                "service call"
            ),
        }
    }
}

impl<S: AppService> AppService for LogService<S> {
    async fn put(&self, namespace: &str, draft: AppDraft) -> Result<App, ServiceError> {
        let begin = Instant::now();
        let result = self.next.put(namespace, draft).await;
        self.record(Method::Put, begin, result.as_ref().err());
        result
    }

    async fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        let begin = Instant::now();
        let result = self.next.query(namespace, options).await;
        self.record(Method::Query, begin, result.as_ref().err());
        result
    }
}
