//! Request interceptors.
//!
//! An interceptor is a hook the proxy calls for every request it forwards,
//! and again for the response it receives. The request hook is the only one
//! allowed to change anything, and only the request head: the body is
//! streamed to the upstream untouched.
//!
//! Interceptors are chained with an [`InterceptorChain`]. The proxy only
//! knows about the [`RequestInterceptor`] trait.
use std::sync::Arc;

use hyper::http::{request, response};

/// A hook invoked by the proxy for every forwarded request.
pub trait RequestInterceptor: Send + Sync {
    /// It receives the head of an outbound request and returns the head that
    /// will be forwarded.
    fn on_request(&self, request: request::Parts) -> request::Parts;

    /// Read-only hook for the response to a request returned by
    /// [`on_request`](RequestInterceptor::on_request). For diagnostics only.
    fn on_response(&self, _request: &request::Parts, _response: &response::Parts) {}
}

/// Applies a list of interceptors in order. The output of one interceptor is
/// the input of the next one.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    #[must_use]
    pub fn new(interceptors: Vec<Arc<dyn RequestInterceptor>>) -> Self {
        Self { interceptors }
    }

    #[must_use]
    pub fn with(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain").field("interceptors", &self.interceptors.len()).finish()
    }
}

impl RequestInterceptor for InterceptorChain {
    fn on_request(&self, request: request::Parts) -> request::Parts {
        self.interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor.on_request(request))
    }

    fn on_response(&self, request: &request::Parts, response: &response::Parts) {
        for interceptor in &self.interceptors {
            interceptor.on_response(request, response);
        }
    }
}
