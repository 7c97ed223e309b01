//! The handler middleware chain.
//!
//! A [`Chain`] is an ordered list of named [`Step`]s built once at startup
//! and applied to every API route. The first step is the outermost: it
//! sees the request first and the response last. Any step may answer the
//! request itself instead of calling the next one.
//!
//! The console uses the fixed order built by [`Chain::with_constraints`]:
//!
//! ```text
//! ctx_prepare -> log -> instrument -> secure_headers -> debug_headers
//!             -> cors -> has_user_agent -> handler
//! ```
//!
//! Because `has_user_agent` is innermost, a rejected request is still
//! logged and instrumented with its `400` status, but never reaches the
//! handler.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request, State};
use axum::http::header::{
    STRICT_TRANSPORT_SECURITY, USER_AGENT, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
    X_XSS_PROTECTION,
};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::{Next, from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use console_app::Recorder;
use tower_http::cors::{Any, CorsLayer};
use tracing::Span;
use uuid::Uuid;

use crate::error::HttpError;

/// Response header carrying the build revision.
pub const HEADER_REVISION: HeaderName = HeaderName::from_static("x-console-revision");

/// Response header carrying the serving host.
pub const HEADER_HOSTNAME: HeaderName = HeaderName::from_static("x-console-hostname");

/// Route label used when no route matched.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Per-request values attached by the `ctx_prepare` step.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// API version serving the request.
    pub version: Arc<str>,
    /// Random id correlating log records of one request.
    pub request_id: Uuid,
}

/// Settings for [`Chain::with_constraints`].
pub struct ChainConfig {
    /// API version attached to every request context.
    pub version: String,
    /// Component label for request metrics.
    pub component: String,
    /// Build revision sent in [`HEADER_REVISION`].
    pub revision: String,
    /// Host name sent in [`HEADER_HOSTNAME`].
    pub hostname: String,
    /// Parent span for request log records.
    pub span: Span,
    /// Recorder for request metrics (labels: component, route, method).
    pub recorder: Arc<dyn Recorder>,
}

/// Errors raised while building a chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A debug header value contains characters not allowed in headers.
    #[error("invalid header value for {name}: {value}")]
    InvalidHeader {
        /// The header being built.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

#[derive(Clone)]
struct InstrumentState {
    component: Arc<str>,
    recorder: Arc<dyn Recorder>,
}

#[derive(Clone)]
struct DebugState {
    revision: HeaderValue,
    hostname: HeaderValue,
}

/// One named middleware step.
#[derive(Clone)]
pub enum Step {
    /// Attach a [`RequestContext`] to the request.
    CtxPrepare {
        /// API version.
        version: Arc<str>,
    },
    /// Emit one log record per request under `span`.
    Log {
        /// Parent span for the records.
        span: Span,
    },
    /// Record request count, error count (status >= 400) and latency.
    Instrument {
        /// Component label.
        component: Arc<str>,
        /// Metric recorder.
        recorder: Arc<dyn Recorder>,
    },
    /// Add transport security headers to every response.
    SecureHeaders,
    /// Add revision and hostname headers to every response.
    DebugHeaders {
        /// Revision header value.
        revision: HeaderValue,
        /// Hostname header value.
        hostname: HeaderValue,
    },
    /// Permissive CORS, answering preflight requests.
    Cors,
    /// Reject requests without a `User-Agent` header.
    HasUserAgent,
}

impl Step {
    /// Build a [`Step::DebugHeaders`] from plain strings.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidHeader`] if either value is not a valid
    /// header value.
    pub fn debug_headers(revision: &str, hostname: &str) -> Result<Self, ChainError> {
        let revision =
            HeaderValue::from_str(revision).map_err(|e| ChainError::InvalidHeader {
                name: "revision",
                value: format!("{revision:?} ({e})"),
            })?;
        let hostname =
            HeaderValue::from_str(hostname).map_err(|e| ChainError::InvalidHeader {
                name: "hostname",
                value: format!("{hostname:?} ({e})"),
            })?;
        Ok(Self::DebugHeaders { revision, hostname })
    }

    /// Stable name of the step.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CtxPrepare { .. } => "ctx_prepare",
            Self::Log { .. } => "log",
            Self::Instrument { .. } => "instrument",
            Self::SecureHeaders => "secure_headers",
            Self::DebugHeaders { .. } => "debug_headers",
            Self::Cors => "cors",
            Self::HasUserAgent => "has_user_agent",
        }
    }

    /// Wrap `router` with this step as its new outermost layer.
    pub fn wrap<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match self {
            Self::CtxPrepare { version } => router.layer(from_fn_with_state(version, ctx_prepare)),
            Self::Log { span } => router.layer(from_fn_with_state(span, log_request)),
            Self::Instrument {
                component,
                recorder,
            } => router.layer(from_fn_with_state(
                InstrumentState {
                    component,
                    recorder,
                },
                instrument,
            )),
            Self::SecureHeaders => router.layer(from_fn(secure_headers)),
            Self::DebugHeaders { revision, hostname } => router.layer(from_fn_with_state(
                DebugState { revision, hostname },
                debug_headers,
            )),
            Self::Cors => router.layer(cors_layer()),
            Self::HasUserAgent => router.layer(from_fn(has_user_agent)),
        }
    }
}

/// An ordered list of [`Step`]s applied identically to every wrapped route.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Step>,
}

impl Chain {
    /// An empty chain.
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append `step` as the new innermost step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// The console's constraint chain, in its fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidHeader`] if the revision or hostname
    /// cannot be sent as a header.
    pub fn with_constraints(config: ChainConfig) -> Result<Self, ChainError> {
        Ok(Self::new()
            .step(Step::CtxPrepare {
                version: Arc::from(config.version),
            })
            .step(Step::Log { span: config.span })
            .step(Step::Instrument {
                component: Arc::from(config.component),
                recorder: config.recorder,
            })
            .step(Step::SecureHeaders)
            .step(Step::debug_headers(&config.revision, &config.hostname)?)
            .step(Step::Cors)
            .step(Step::HasUserAgent))
    }

    /// Step names, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Wrap `router` so that requests pass through every step in order.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.steps
            .iter()
            .rev()
            .cloned()
            .fold(router, |router, step| step.wrap(router))
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

async fn ctx_prepare(State(version): State<Arc<str>>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(RequestContext {
        version,
        request_id: Uuid::new_v4(),
    });
    next.run(req).await
}

async fn log_request(State(span): State<Span>, req: Request, next: Next) -> Response {
    let begin = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let route = matched_route(&req);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let context = req.extensions().get::<RequestContext>().cloned();

    let response = next.run(req).await;

    let duration_ns = u64::try_from(begin.elapsed().as_nanos()).unwrap_or(u64::MAX);
    let version = context.as_ref().map(|c| c.version.to_string()).unwrap_or_default();
    let request_id = context.map(|c| c.request_id.to_string()).unwrap_or_default();

    tracing::info!(
        parent: &span,
        method = %method,
        path = path.as_str(),
        route = route.as_str(),
        status = response.status().as_u16(),
        duration_ns,
        version = version.as_str(),
        request_id = request_id.as_str(),
        user_agent = user_agent.as_str(),
        "request"
    );

    response
}

async fn instrument(State(state): State<InstrumentState>, req: Request, next: Next) -> Response {
    let begin = Instant::now();
    let route = matched_route(&req);
    let method = req.method().as_str().to_owned();

    let response = next.run(req).await;

    let labels = [state.component.as_ref(), route.as_str(), method.as_str()];
    state.recorder.incr_op(&labels);
    if response.status().as_u16() >= 400 {
        state.recorder.incr_err(&labels);
    }
    state.recorder.observe_latency(&labels, begin.elapsed());

    response
}

async fn secure_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    response
}

async fn debug_headers(State(state): State<DebugState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(HEADER_REVISION, state.revision);
    headers.insert(HEADER_HOSTNAME, state.hostname);
    response
}

async fn has_user_agent(req: Request, next: Next) -> Response {
    let present = req
        .headers()
        .get(USER_AGENT)
        .is_some_and(|v| !v.is_empty());

    if !present {
        return HttpError::BadRequest(String::from("user-agent header required")).into_response();
    }

    next.run(req).await
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

fn matched_route(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_owned(), |p| p.as_str().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use axum::routing::get;
    use console_app::CountingRecorder;
    use tower::ServiceExt;

    use super::*;

    fn stub(hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/stub",
            get(move || async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "ok"
            }),
        )
    }

    fn request(user_agent: Option<&str>) -> Request {
        let mut builder = axum::http::Request::get("/stub");
        if let Some(ua) = user_agent {
            builder = builder.header(header::USER_AGENT, ua);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn has_user_agent_rejects_missing_header() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Step::HasUserAgent.wrap(stub(Arc::clone(&hits)));

        let response = router.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn has_user_agent_passes_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Step::HasUserAgent.wrap(stub(Arc::clone(&hits)));

        let response = router.oneshot(request(Some("test/1.0"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn secure_headers_are_added() {
        let router = Step::SecureHeaders.wrap(stub(Arc::default()));

        let response = router.oneshot(request(None)).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[X_XSS_PROTECTION], "1; mode=block");
        assert!(headers.contains_key(STRICT_TRANSPORT_SECURITY));
    }

    #[tokio::test]
    async fn debug_headers_are_added() {
        let step = Step::debug_headers("abc1234", "host-1").unwrap();
        let router = step.wrap(stub(Arc::default()));

        let response = router.oneshot(request(None)).await.unwrap();

        assert_eq!(response.headers()[HEADER_REVISION], "abc1234");
        assert_eq!(response.headers()[HEADER_HOSTNAME], "host-1");
    }

    #[test]
    fn debug_headers_reject_invalid_values() {
        assert!(Step::debug_headers("rev\n", "host").is_err());
    }

    #[tokio::test]
    async fn ctx_prepare_attaches_context() {
        let router = Router::new().route(
            "/stub",
            get(|req: Request| async move {
                let ctx = req.extensions().get::<RequestContext>().unwrap();
                ctx.version.to_string()
            }),
        );
        let router = Step::CtxPrepare {
            version: Arc::from("0.4"),
        }
        .wrap(router);

        let response = router.oneshot(request(None)).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"0.4");
    }

    #[tokio::test]
    async fn instrument_counts_requests_and_errors() {
        let recorder = Arc::new(CountingRecorder::new());
        let router = Chain::new()
            .step(Step::Instrument {
                component: Arc::from("console"),
                recorder: recorder.clone(),
            })
            .step(Step::HasUserAgent)
            .wrap(stub(Arc::default()));

        router.clone().oneshot(request(Some("ua"))).await.unwrap();
        router.oneshot(request(None)).await.unwrap();

        let counts = recorder.counts(&["console", "/stub", "GET"]);
        assert_eq!(counts.ops, 2);
        assert_eq!(counts.errs, 1);
        assert_eq!(counts.latencies, 2);
    }

    #[tokio::test]
    async fn cors_answers_preflight() {
        let router = Step::Cors.wrap(stub(Arc::default()));

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/stub")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn constraint_chain_order_is_fixed() {
        let chain = Chain::with_constraints(ChainConfig {
            version: String::from("0.4"),
            component: String::from("console"),
            revision: String::from("0000000-dev"),
            hostname: String::from("localhost"),
            span: Span::none(),
            recorder: Arc::new(CountingRecorder::new()),
        })
        .unwrap();

        assert_eq!(
            chain.names(),
            vec![
                "ctx_prepare",
                "log",
                "instrument",
                "secure_headers",
                "debug_headers",
                "cors",
                "has_user_agent",
            ]
        );
    }
}
