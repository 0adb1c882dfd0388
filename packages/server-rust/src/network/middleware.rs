//! HTTP middleware stack for the roster server.
//!
//! Builds the Tower middleware pipeline applied to all HTTP requests.
//! Middleware ordering follows the outer-to-inner convention: the first
//! layer listed is the outermost (processes the request first on the way
//! in, and the response last on the way out).

use axum::http::{Method, StatusCode};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use super::config::NetworkConfig;
use crate::observability::AccessLogLayer;

/// The composed Tower layer type produced by [`build_http_layers`].
///
/// This type alias keeps the function signature readable. Each layer
/// wraps the next in a `Stack`, from outermost (first applied) to
/// innermost (last applied).
type HttpLayers = tower::layer::util::Stack<
    TimeoutLayer,
    tower::layer::util::Stack<
        CorsLayer,
        tower::layer::util::Stack<AccessLogLayer, tower::layer::util::Identity>,
    >,
>;

/// Builds the HTTP-level Tower middleware stack from the network configuration.
///
/// **Middleware ordering (outermost to innermost):**
/// 1. `AccessLog` -- establishes the request's correlation context, times the
///    whole chain, and emits one access record per request. Outermost so it
///    observes everything the layers below produce, timeout responses
///    included.
/// 2. `CORS` -- Cross-Origin Resource Sharing based on configured origins
/// 3. `Timeout` -- enforces a maximum request processing duration; an expired
///    request surfaces as a 408 response the access log classifies normally
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let cors = build_cors_layer(&config.cors_origins);

    ServiceBuilder::new()
        .layer(AccessLogLayer::new())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .into_inner()
}

/// Builds the CORS layer from the configured list of allowed origins.
///
/// A wildcard `"*"` in the origins list allows any origin. Otherwise,
/// each origin string is parsed and added to an explicit allowlist.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}
