//! Instrumentation decorator.
//!
//! [`InstrumentService`] records, after each delegated call, one op count,
//! one error count when the call failed, and the wall-clock latency of the
//! call. Labels are `component, method, namespace, store`, in that order.

use std::sync::Arc;
use std::time::Instant;

use crate::error::ServiceError;
use crate::metrics::Recorder;
use crate::model::{App, AppDraft, QueryOptions};
use crate::service::{AppService, Method};

/// Wraps an [`AppService`] and records metrics for every call.
pub struct InstrumentService<S> {
    next: S,
    component: String,
    store: String,
    recorder: Arc<dyn Recorder>,
}

impl<S: AppService> InstrumentService<S> {
    /// Decorate `next`, tagging metrics with `component` and `store`.
    pub fn new(next: S, component: &str, store: &str, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            next,
            component: component.to_owned(),
            store: store.to_owned(),
            recorder,
        }
    }

    fn track(&self, method: Method, namespace: &str, begin: Instant, failed: bool) {
        let labels = [
            self.component.as_str(),
            method.as_str(),
            namespace,
            self.store.as_str(),
        ];

        self.recorder.incr_op(&labels);
        if failed {
            self.recorder.incr_err(&labels);
        }
        self.recorder.observe_latency(&labels, begin.elapsed());
    }
}

impl<S: AppService> AppService for InstrumentService<S> {
    async fn put(&self, namespace: &str, draft: AppDraft) -> Result<App, ServiceError> {
        let begin = Instant::now();
        let result = self.next.put(namespace, draft).await;
        self.track(Method::Put, namespace, begin, result.is_err());
        result
    }

    async fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        let begin = Instant::now();
        let result = self.next.query(namespace, options).await;
        self.track(Method::Query, namespace, begin, result.is_err());
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryService;
    use crate::metrics::CountingRecorder;

    #[tokio::test]
    async fn successful_calls_count_ops_but_not_errors() {
        let recorder = Arc::new(CountingRecorder::new());
        let service =
            InstrumentService::new(MemoryService::new(), "console", "memory", recorder.clone());

        let apps = service.query("ns", &QueryOptions::default()).await.unwrap();
        assert!(apps.is_empty());

        let counts = recorder.counts(&["console", "Query", "ns", "memory"]);
        assert_eq!(counts.ops, 1);
        assert_eq!(counts.errs, 0);
        assert_eq!(counts.latencies, 1);
    }
}
