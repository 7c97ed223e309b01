//! Metric recording for decorators and middleware.
//!
//! Every instrumented layer records through the [`Recorder`] trait and
//! receives its recorder at construction time. [`KeyMetrics`] is the
//! Prometheus implementation wired by the binary; [`CountingRecorder`]
//! keeps plain counts in memory.
//!
//! # Metric families
//!
//! | Metric | Type |
//! |--------|------|
//! | `<ns>_op_count_total` | Counter |
//! | `<ns>_err_count_total` | Counter |
//! | `<ns>_op_latency_seconds` | Histogram |

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

/// Label name for the component emitting the metric.
pub const FIELD_COMPONENT: &str = "component";
/// Label name for the operation or HTTP method.
pub const FIELD_METHOD: &str = "method";
/// Label name for the store namespace.
pub const FIELD_NAMESPACE: &str = "namespace";
/// Label name for the matched route.
pub const FIELD_ROUTE: &str = "route";
/// Label name for the store kind.
pub const FIELD_STORE: &str = "store";

/// Records operation counts, error counts and latencies by label set.
///
/// Label values are positional and must line up with the label fields the
/// recorder was built with.
pub trait Recorder: Send + Sync {
    /// Count one operation.
    fn incr_op(&self, labels: &[&str]);

    /// Count one failed operation.
    fn incr_err(&self, labels: &[&str]);

    /// Observe the wall-clock duration of one operation.
    fn observe_latency(&self, labels: &[&str], elapsed: Duration);
}

/// Errors raised while building [`KeyMetrics`].
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to create or register a metric with Prometheus.
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
}

/// Prometheus-backed [`Recorder`]: an error counter, an op counter and a
/// latency histogram sharing one label set.
#[derive(Clone)]
pub struct KeyMetrics {
    err_count: CounterVec,
    op_count: CounterVec,
    op_latency: HistogramVec,
}

impl KeyMetrics {
    /// Create the three metrics under `namespace` and register them.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Registration`] if a metric name is invalid or
    /// already registered.
    pub fn new(registry: &Registry, namespace: &str, fields: &[&str]) -> Result<Self, MetricsError> {
        let err_count = CounterVec::new(
            Opts::new("err_count_total", "Number of failed operations").namespace(namespace),
            fields,
        )?;
        registry.register(Box::new(err_count.clone()))?;

        let op_count = CounterVec::new(
            Opts::new("op_count_total", "Number of operations").namespace(namespace),
            fields,
        )?;
        registry.register(Box::new(op_count.clone()))?;

        let op_latency = HistogramVec::new(
            HistogramOpts::new("op_latency_seconds", "Distribution of operation latencies")
                .namespace(namespace),
            fields,
        )?;
        registry.register(Box::new(op_latency.clone()))?;

        Ok(Self {
            err_count,
            op_count,
            op_latency,
        })
    }
}

impl Recorder for KeyMetrics {
    fn incr_op(&self, labels: &[&str]) {
        match self.op_count.get_metric_with_label_values(labels) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::warn!(error = %e, ?labels, "op counter label mismatch"),
        }
    }

    fn incr_err(&self, labels: &[&str]) {
        match self.err_count.get_metric_with_label_values(labels) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::warn!(error = %e, ?labels, "err counter label mismatch"),
        }
    }

    fn observe_latency(&self, labels: &[&str], elapsed: Duration) {
        match self.op_latency.get_metric_with_label_values(labels) {
            Ok(histogram) => histogram.observe(elapsed.as_secs_f64()),
            Err(e) => tracing::warn!(error = %e, ?labels, "latency histogram label mismatch"),
        }
    }
}

/// Counts recorded by a [`CountingRecorder`] for one label set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Operations counted.
    pub ops: u64,
    /// Failed operations counted.
    pub errs: u64,
    /// Latency observations made.
    pub latencies: u64,
}

/// In-memory [`Recorder`] keyed by label set.
#[derive(Debug, Default)]
pub struct CountingRecorder {
    counts: Mutex<BTreeMap<Vec<String>, Counts>>,
}

impl CountingRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for exactly this label set.
    pub fn counts(&self, labels: &[&str]) -> Counts {
        let key: Vec<String> = labels.iter().map(|l| (*l).to_owned()).collect();
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
            .unwrap_or_default()
    }

    /// Counts summed over every label set.
    pub fn totals(&self) -> Counts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .fold(Counts::default(), |acc, c| Counts {
                ops: acc.ops.saturating_add(c.ops),
                errs: acc.errs.saturating_add(c.errs),
                latencies: acc.latencies.saturating_add(c.latencies),
            })
    }

    fn update(&self, labels: &[&str], f: impl FnOnce(&mut Counts)) {
        let key = labels.iter().map(|l| (*l).to_owned()).collect();
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        f(counts.entry(key).or_default());
    }
}

impl Recorder for CountingRecorder {
    fn incr_op(&self, labels: &[&str]) {
        self.update(labels, |c| c.ops = c.ops.saturating_add(1));
    }

    fn incr_err(&self, labels: &[&str]) {
        self.update(labels, |c| c.errs = c.errs.saturating_add(1));
    }

    fn observe_latency(&self, labels: &[&str], _elapsed: Duration) {
        self.update(labels, |c| c.latencies = c.latencies.saturating_add(1));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prometheus::{Encoder, TextEncoder};

    use super::*;

    #[test]
    fn key_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = KeyMetrics::new(&registry, "service", &[FIELD_METHOD, FIELD_STORE]).unwrap();

        metrics.incr_op(&["Put", "memory"]);
        metrics.incr_err(&["Put", "memory"]);
        metrics.observe_latency(&["Put", "memory"], Duration::from_millis(5));

        let mut buf = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("service_op_count_total{method=\"Put\",store=\"memory\"} 1"));
        assert!(text.contains("service_err_count_total{method=\"Put\",store=\"memory\"} 1"));
        assert!(text.contains("service_op_latency_seconds_count{method=\"Put\",store=\"memory\"} 1"));
    }

    #[test]
    fn key_metrics_reject_duplicate_namespace() {
        let registry = Registry::new();
        KeyMetrics::new(&registry, "handler", &[FIELD_ROUTE]).unwrap();
        assert!(KeyMetrics::new(&registry, "handler", &[FIELD_ROUTE]).is_err());
    }

    #[test]
    fn key_metrics_ignore_label_mismatch() {
        let registry = Registry::new();
        let metrics = KeyMetrics::new(&registry, "service", &[FIELD_METHOD]).unwrap();
        // Wrong arity is logged, not a panic.
        metrics.incr_op(&["Put", "extra"]);
    }

    #[test]
    fn counting_recorder_keys_by_labels() {
        let recorder = CountingRecorder::new();
        recorder.incr_op(&["a"]);
        recorder.incr_op(&["a"]);
        recorder.incr_err(&["b"]);
        recorder.observe_latency(&["a"], Duration::ZERO);

        assert_eq!(
            recorder.counts(&["a"]),
            Counts {
                ops: 2,
                errs: 0,
                latencies: 1
            }
        );
        assert_eq!(recorder.counts(&["b"]).errs, 1);
        assert_eq!(recorder.totals().ops, 2);
    }
}
