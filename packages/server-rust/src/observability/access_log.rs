//! Transport-level access logging with request correlation.
//!
//! [`AccessLogLayer`] wraps the whole handling chain as the outermost tower
//! layer. Per request it establishes the correlation scope, times the chain,
//! classifies the outcome, and emits exactly one access record — on normal
//! completion, on error, and on abort alike. The record is emitted before
//! the scope is released, so teardown can never race ahead of it, and log
//! emission can never prevent teardown.
//!
//! Record shape, on the dedicated `access_log` target:
//!
//! ```text
//! ip=<addr> method=<METHOD> request_url=<path> status=<code|-> success=<SUCCESS|FAIL> time=<ms>ms
//! ```
//!
//! with `trace_id` and `actor` attached as structured fields.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use http::header::HeaderName;
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use tower::{Layer, Service};
use tracing::info;

use roster_core::RequestContext;

use super::correlation;

/// Log target for access records, distinct from module-path targets so the
/// access log can be filtered and routed independently.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// Response header carrying the request's trace id back to the client.
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

/// Resolves the actor identity a request is attributed to.
///
/// Seam for a real identity provider. The pipeline does not care how the
/// identity is derived; it only stamps the resolved value on every record.
pub trait IdentityResolver: Send + Sync {
    /// Returns the actor for a request with the given headers.
    fn actor(&self, headers: &HeaderMap) -> String;
}

/// Default resolver used until a real identity provider is integrated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderIdentity;

impl PlaceholderIdentity {
    /// Actor recorded for every request.
    pub const ACTOR: &'static str = "anonymous";
}

impl IdentityResolver for PlaceholderIdentity {
    fn actor(&self, _headers: &HeaderMap) -> String {
        Self::ACTOR.to_string()
    }
}

// ---------------------------------------------------------------------------
// AccessLogLayer
// ---------------------------------------------------------------------------

/// Tower layer applying [`AccessLogService`] around the wrapped service.
#[derive(Clone)]
pub struct AccessLogLayer {
    identity: Arc<dyn IdentityResolver>,
}

impl AccessLogLayer {
    /// Creates the layer with the placeholder identity resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_identity(PlaceholderIdentity)
    }

    /// Creates the layer with a custom identity resolver.
    pub fn with_identity(identity: impl IdentityResolver + 'static) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }
}

impl Default for AccessLogLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessLogLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLogLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogService {
            inner,
            identity: Arc::clone(&self.identity),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessLogService
// ---------------------------------------------------------------------------

/// Service wrapper timing and logging every request it dispatches.
pub struct AccessLogService<S> {
    inner: S,
    identity: Arc<dyn IdentityResolver>,
}

impl<S: Clone> Clone for AccessLogService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for AccessLogService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLogService")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AccessLogService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send,
    S::Error: fmt::Display,
    S::Future: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let ctx = RequestContext::new(self.identity.actor(req.headers()));

        let client = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string());
        let mut pending = PendingAccessRecord::begin(
            client,
            req.method().to_string(),
            req.uri().path().to_string(),
            &ctx,
        );

        // The context is readable two ways downstream: ambiently via
        // `correlation::current()`, and explicitly from request extensions.
        req.extensions_mut().insert(ctx.clone());

        let trace_header = HeaderValue::from_str(&ctx.trace_id.to_string()).ok();
        let fut = self.inner.call(req);

        Box::pin(correlation::scope(ctx, async move {
            match fut.await {
                Ok(mut response) => {
                    pending.complete(response.status());
                    if let Some(value) = trace_header {
                        response.headers_mut().insert(TRACE_ID_HEADER, value);
                    }
                    Ok(response)
                }
                Err(err) => {
                    pending.fail(&err);
                    Err(err)
                }
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// PendingAccessRecord
// ---------------------------------------------------------------------------

/// Access record captured at request entry and emitted exactly once.
///
/// Emission normally happens in [`complete`](Self::complete) or
/// [`fail`](Self::fail). If the response future is dropped before either
/// runs (client disconnect, cancellation from an outer layer), the `Drop`
/// impl emits the record with an absent status and a `FAIL` outcome, so the
/// per-request record is never lost. The record owns its correlation fields
/// and does not depend on the ambient scope still being bound at drop time.
struct PendingAccessRecord {
    client: Option<String>,
    method: String,
    path: String,
    trace_id: String,
    actor: String,
    start: Instant,
    emitted: bool,
}

impl PendingAccessRecord {
    fn begin(client: Option<String>, method: String, path: String, ctx: &RequestContext) -> Self {
        Self {
            client,
            method,
            path,
            trace_id: ctx.trace_id.to_string(),
            actor: ctx.actor.clone(),
            start: Instant::now(),
            emitted: false,
        }
    }

    /// The chain produced a response. A server-error status counts as a
    /// failed outcome: the router has already converted any raised handler
    /// error into a 5xx by the time it reaches this layer.
    fn complete(&mut self, status: StatusCode) {
        self.emit(Some(status), !status.is_server_error());
    }

    /// The chain raised an error before producing a response.
    fn fail(&mut self, err: &impl fmt::Display) {
        tracing::error!(
            target: ACCESS_LOG_TARGET,
            trace_id = %self.trace_id,
            error = %err,
            "request failed before a response was produced"
        );
        self.emit(None, false);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn emit(&mut self, status: Option<StatusCode>, success: bool) {
        self.emitted = true;
        let time = self.start.elapsed().as_millis() as u64;
        let status = status.map_or_else(|| "-".to_string(), |s| s.as_u16().to_string());
        info!(
            target: ACCESS_LOG_TARGET,
            trace_id = %self.trace_id,
            actor = %self.actor,
            "ip={} method={} request_url={} status={} success={} time={}ms",
            self.client.as_deref().unwrap_or("-"),
            self.method,
            self.path,
            status,
            if success { "SUCCESS" } else { "FAIL" },
            time,
        );
    }
}

impl Drop for PendingAccessRecord {
    fn drop(&mut self) {
        if !self.emitted {
            self.emit(None, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tower::{service_fn, ServiceExt};
    use tracing::Level;

    use super::*;
    use crate::observability::capture;
    use crate::observability::instrument::instrumented;

    fn request(path: &str, client: Option<SocketAddr>) -> Request<()> {
        let mut req = Request::builder().uri(path).body(()).unwrap();
        if let Some(addr) = client {
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    /// Inner service that responds immediately with a fixed status.
    #[derive(Clone)]
    struct StatusService(StatusCode);

    impl Service<Request<()>> for StatusService {
        type Response = Response<()>;
        type Error = Infallible;
        type Future = std::future::Ready<Result<Response<()>, Infallible>>;

        fn poll_ready(
            &mut self,
            _cx: &mut std::task::Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<()>) -> Self::Future {
            std::future::ready(Ok(Response::builder().status(self.0).body(()).unwrap()))
        }
    }

    fn access_records(sink: &capture::EventSink) -> Vec<capture::CapturedEvent> {
        sink.events()
            .into_iter()
            .filter(|e| e.target == ACCESS_LOG_TARGET && e.level == Level::INFO)
            .collect()
    }

    #[tokio::test]
    async fn successful_request_emits_one_success_record() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(StatusService(StatusCode::OK));

        let addr: SocketAddr = "10.0.0.5:50000".parse().unwrap();
        let response = svc.oneshot(request("/getUsers", Some(addr))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let records = access_records(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.starts_with(
            "ip=10.0.0.5 method=GET request_url=/getUsers status=200 success=SUCCESS time="
        ));
        assert!(records[0].message.ends_with("ms"));
        assert_eq!(records[0].field("actor"), Some(PlaceholderIdentity::ACTOR));
    }

    #[tokio::test]
    async fn server_error_response_is_classified_as_fail() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(StatusService(StatusCode::INTERNAL_SERVER_ERROR));

        let response = svc.oneshot(request("/fireException", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let records = access_records(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0]
            .message
            .contains("status=500 success=FAIL"));
        // No resolvable client address renders as "-".
        assert!(records[0].message.starts_with("ip=- "));
    }

    #[tokio::test]
    async fn client_error_response_still_counts_as_success() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(StatusService(StatusCode::BAD_REQUEST));

        svc.oneshot(request("/addUser", None)).await.unwrap();

        let records = access_records(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("status=400 success=SUCCESS"));
    }

    #[tokio::test]
    async fn inner_service_error_is_logged_and_propagated_unchanged() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(service_fn(|_req: Request<()>| async {
            Err::<Response<()>, String>("connection reset".to_string())
        }));

        let err = svc.oneshot(request("/getUsers", None)).await.unwrap_err();

        assert_eq!(err, "connection reset");
        let records = access_records(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("status=- success=FAIL"));
    }

    #[tokio::test]
    async fn dropped_request_future_still_emits_one_fail_record() {
        let (sink, _guard) = capture::install();
        let mut svc = AccessLogLayer::new().layer(service_fn(|_req: Request<()>| async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok::<_, Infallible>(Response::builder().body(()).unwrap())
        }));

        let fut = svc.call(request("/getUsers", None));
        drop(fut);

        let records = access_records(&sink);
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains("status=- success=FAIL"));
    }

    #[tokio::test]
    async fn response_carries_the_trace_id_header_matching_the_record() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(StatusService(StatusCode::OK));

        let response = svc.oneshot(request("/getUsers", None)).await.unwrap();

        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert_eq!(header.len(), 32);
        assert_eq!(access_records(&sink)[0].field("trace_id"), Some(header.as_str()));
    }

    #[tokio::test]
    async fn downstream_code_observes_the_context_ambiently_and_via_extensions() {
        let (_sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(service_fn(|req: Request<()>| async move {
            let ambient = correlation::current();
            let extension = req.extensions().get::<RequestContext>().cloned().unwrap();
            assert!(!ambient.is_detached());
            assert_eq!(ambient, extension);
            Ok::<_, Infallible>(Response::builder().body(()).unwrap())
        }));

        svc.oneshot(request("/getUsers", None)).await.unwrap();
        assert!(correlation::current().is_detached());
    }

    #[tokio::test]
    async fn custom_identity_resolver_sets_the_actor() {
        struct HeaderIdentity;
        impl IdentityResolver for HeaderIdentity {
            fn actor(&self, headers: &HeaderMap) -> String {
                headers
                    .get("x-user")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or(PlaceholderIdentity::ACTOR)
                    .to_string()
            }
        }

        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::with_identity(HeaderIdentity).layer(StatusService(StatusCode::OK));

        let mut req = request("/getUsers", None);
        req.headers_mut()
            .insert("x-user", HeaderValue::from_static("alice"));
        svc.oneshot(req).await.unwrap();

        assert_eq!(access_records(&sink)[0].field("actor"), Some("alice"));
    }

    #[tokio::test]
    async fn method_records_precede_the_access_record() {
        let (sink, _guard) = capture::install();
        let svc = AccessLogLayer::new().layer(service_fn(|_req: Request<()>| async {
            instrumented("UserService", "get_users", async {
                Ok::<_, Infallible>(())
            })
            .await?;
            Ok::<_, Infallible>(Response::builder().body(()).unwrap())
        }));

        svc.oneshot(request("/getUsers", None)).await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(events[0].message.starts_with("START UserService#get_users"));
        assert!(events[1].message.starts_with("END   UserService#get_users"));
        assert!(events[2].message.starts_with("ip="));
        // Method records carry the same trace id the access record does.
        assert_eq!(events[0].field("trace_id"), events[2].field("trace_id"));
    }
}
