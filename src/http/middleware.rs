//! Access Filter Middleware.
//! Installs the access decision engine in front of an axum router.
//!
//! ```ignore
//! let state = AccessFilterState::new(SharedPolicy::new(policy));
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state, access_filter_middleware));
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! ```

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::access::{explain, EvaluationRequest, SharedPolicy};
use crate::observability::metrics;

/// State required for access filtering.
#[derive(Clone, Debug)]
pub struct AccessFilterState {
    pub policy: SharedPolicy,
    pub metrics_enabled: bool,
}

impl AccessFilterState {
    pub fn new(policy: SharedPolicy) -> Self {
        Self {
            policy,
            metrics_enabled: true,
        }
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }
}

/// Remote address of the connection, with port. Empty when the server was not
/// started with connect info.
pub fn client_address(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// The response written for denied requests.
pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

pub async fn access_filter_middleware(
    State(state): State<AccessFilterState>,
    req: Request,
    next: Next,
) -> Response {
    let address = client_address(&req);
    let policy = state.policy.load();
    let verdict = explain(&policy, &EvaluationRequest::new(&address, req.headers()));

    if state.metrics_enabled {
        metrics::record_decision(verdict.decision, verdict.reason);
    }

    if verdict.decision.is_allow() {
        debug!(
            client = %verdict.client_address,
            reason = %verdict.reason,
            path = %req.uri().path(),
            "Request allowed"
        );
        next.run(req).await
    } else {
        warn!(
            client = %verdict.client_address,
            reason = %verdict.reason,
            path = %req.uri().path(),
            "Request forbidden"
        );
        forbidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessPolicy;
    use crate::config::schema::FilterConfig;
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(config: FilterConfig, hits: Arc<AtomicUsize>) -> Router {
        let policy = AccessPolicy::from_config(&config).unwrap();
        let state = AccessFilterState::new(SharedPolicy::new(policy)).with_metrics(false);

        Router::new()
            .route(
                "/",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "downstream"
                    }
                }),
            )
            .layer(from_fn_with_state(state, access_filter_middleware))
    }

    fn request(addr: &str, header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("X-Custom-Header", value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        req
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_allowed_request_reaches_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(FilterConfig::default(), hits.clone())
            .oneshot(request("9.9.9.9:1", Some("ExpectedValue")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "downstream");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_request_gets_403() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(FilterConfig::default(), hits.clone())
            .oneshot(request("9.9.9.9:1", Some("WrongValue")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .starts_with("text/plain"));
        assert_eq!(body_text(response).await, "Forbidden");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blocklisted_ipv6_client() {
        let hits = Arc::new(AtomicUsize::new(0));
        let config = FilterConfig {
            disallowed_ips: vec!["2001:db8::1".into()],
            ..FilterConfig::default()
        };

        let response = app(config, hits.clone())
            .oneshot(request("[2001:db8::1]:443", Some("ExpectedValue")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_connect_info_uses_header_only() {
        let hits = Arc::new(AtomicUsize::new(0));
        let req = axum::http::Request::builder()
            .uri("/")
            .header("x-custom-header", "ExpectedValue")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_address(&req), "");

        let response = app(FilterConfig::default(), hits.clone())
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
