//! Request forwarding.
//!
//! Plain HTTP requests are passed through the interceptor chain and sent to
//! the upstream with the `hyper` legacy client. The upstream response is
//! returned to the proxy client as it is.
//!
//! `CONNECT` requests open a byte-for-byte tunnel to the target. The content
//! of the tunnel, usually TLS, is never inspected.
use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;
use hyper::http::uri::{PathAndQuery, Scheme};
use hyper::http::{header, request, HeaderMap, Uri};
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use super::error::Error;
use super::interceptor::{InterceptorChain, RequestInterceptor};
use super::PROXY_LOG_TARGET;

pub type ProxyBody = BoxBody<Bytes, hyper::Error>;

pub type UpstreamClient = Client<HttpConnector, Incoming>;

/// Headers addressed to the proxy itself. They are never forwarded.
const PROXY_HEADERS: [&str; 2] = ["proxy-connection", "proxy-authorization"];

#[must_use]
pub fn upstream_client() -> UpstreamClient {
    Client::builder(TokioExecutor::new()).build_http()
}

/// Handles one request received by the proxy.
///
/// It never fails: errors are logged and answered with an error response.
///
/// # Errors
///
/// The error type is [`Infallible`].
pub async fn proxy_request(
    request: Request<Incoming>,
    interceptors: Arc<InterceptorChain>,
    client: UpstreamClient,
) -> Result<Response<ProxyBody>, Infallible> {
    let result = if request.method() == Method::CONNECT {
        tunnel(request).await
    } else {
        forward(request, interceptors.as_ref(), &client).await
    };

    Ok(result.unwrap_or_else(|err| {
        warn!(target: PROXY_LOG_TARGET, %err, "request failed");
        error_response(&err)
    }))
}

async fn forward(
    request: Request<Incoming>,
    interceptor: &dyn RequestInterceptor,
    client: &UpstreamClient,
) -> Result<Response<ProxyBody>, Error> {
    let (mut parts, body) = request.into_parts();

    parts.uri = absolute_target(&parts)?;

    let mut parts = interceptor.on_request(parts);

    strip_proxy_headers(&mut parts.headers);

    let upstream = client
        .request(Request::from_parts(parts.clone(), body))
        .await
        .map_err(|source| Error::Upstream {
            target: parts.uri.clone(),
            source,
        })?;

    let (response, body) = upstream.into_parts();

    interceptor.on_response(&parts, &response);

    Ok(Response::from_parts(response, body.boxed()))
}

async fn tunnel(request: Request<Incoming>) -> Result<Response<ProxyBody>, Error> {
    let Some(target) = request.uri().authority().map(ToString::to_string) else {
        return Err(Error::MissingTarget {
            uri: request.uri().clone(),
        });
    };

    let mut upstream = TcpStream::connect(&target).await.map_err(|source| Error::Tunnel {
        target: target.clone(),
        source,
    })?;

    tokio::spawn(async move {
        match hyper::upgrade::on(request).await {
            Ok(upgraded) => {
                let mut client = TokioIo::new(upgraded);

                match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
                    Ok((sent, received)) => {
                        debug!(target: PROXY_LOG_TARGET, upstream = %target, sent, received, "tunnel closed");
                    }
                    Err(err) => debug!(target: PROXY_LOG_TARGET, upstream = %target, %err, "tunnel closed with error"),
                }
            }
            Err(err) => warn!(target: PROXY_LOG_TARGET, upstream = %target, %err, "unable to upgrade the connection"),
        }
    });

    Ok(Response::new(empty()))
}

/// The absolute URL of the request target.
///
/// Proxy clients send absolute-form targets. Clients that were redirected to
/// the proxy without knowing it send origin-form targets, in that case the
/// authority is taken from the `Host` header.
fn absolute_target(parts: &request::Parts) -> Result<Uri, Error> {
    if parts.uri.scheme().is_some() && parts.uri.authority().is_some() {
        return Ok(parts.uri.clone());
    }

    let Some(host) = parts.headers.get(header::HOST).and_then(|host| host.to_str().ok()) else {
        return Err(Error::MissingTarget { uri: parts.uri.clone() });
    };

    Uri::builder()
        .scheme(parts.uri.scheme().cloned().unwrap_or(Scheme::HTTP))
        .authority(host)
        .path_and_query(
            parts
                .uri
                .path_and_query()
                .cloned()
                .unwrap_or_else(|| PathAndQuery::from_static("/")),
        )
        .build()
        .map_err(|source| Error::InvalidTarget { source })
}

fn strip_proxy_headers(headers: &mut HeaderMap) {
    for name in PROXY_HEADERS {
        headers.remove(name);
    }
}

fn error_response(err: &Error) -> Response<ProxyBody> {
    let mut response = Response::new(full(err.to_string()));
    *response.status_mut() = err.status_code();
    response
}

fn empty() -> ProxyBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

fn full(content: String) -> ProxyBody {
    Full::new(Bytes::from(content)).map_err(|never| match never {}).boxed()
}
