//! API routes.
//!
//! Both endpoints are at the root. There is no version prefix because the
//! port change notifier and other scripts call these exact paths.
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use hyper::Request;
use tower_http::propagate_header::PropagateHeaderLayer;
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

use super::handlers::{port_changed_handler, status_handler, ControlState};
use super::API_LOG_TARGET;

const X_REQUEST_ID: &str = "x-request-id";

/// Add all API routes to the router.
pub fn router(state: Arc<ControlState>) -> Router {
    Router::new()
        .route("/portChanged", get(port_changed_handler))
        .route("/status", get(status_handler))
        .with_state(state)
        .layer(PropagateHeaderLayer::new(HeaderName::from_static(X_REQUEST_ID)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(|request: &Request<axum::body::Body>, _span: &Span| {
                    tracing::info!(
                        target: API_LOG_TARGET,
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                        "request");
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    tracing::info!(
                        target: API_LOG_TARGET,
                        latency = %latency.as_millis(),
                        status = %response.status(),
                        request_id = %request_id(response.headers()),
                        "response");
                }),
        )
        .layer(SetRequestIdLayer::x_request_id(RequestIdGenerator))
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[derive(Clone, Default)]
struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).expect("UUID is a valid HTTP header value");
        Some(RequestId::new(id))
    }
}
