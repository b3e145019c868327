//! The announce port rewriter.
//!
//! A `BitTorrent` client reports the port it listens on in the `port` param
//! of its tracker announce requests:
//!
//! ```text
//! http://tracker.example/announce?info_hash=%3B%24U...&peer_id=-qB4650-...&port=6881&uploaded=0&...
//! ```
//!
//! Behind a NAT the port the client listens on is not the port peers can
//! reach. [`AnnouncePortRewriter`] replaces the value of that param with the
//! current public port taken from the [`PortState`].
//!
//! A request is an announce request when its query has the `peer_id`,
//! `info_hash` and `port` params. Anything else goes through untouched. The
//! rewrite works on the parsed params, never on the raw string, so the same
//! digits found in other params or in the path are never modified.
//!
//! If a query has more than one `port` param only the first one is
//! replaced.
use std::sync::Arc;

use hyper::http::uri::PathAndQuery;
use hyper::http::{header, request, response, HeaderValue, Uri};
use tracing::{debug, warn};

use super::interceptor::RequestInterceptor;
use super::query::Query;
use super::PROXY_LOG_TARGET;
use crate::core::port_state::PortState;

/// The params that identify an announce request.
pub const ANNOUNCE_PARAMS: [&str; 3] = ["peer_id", "info_hash", "port"];

/// The param that is rewritten.
pub const PORT_PARAM: &str = "port";

/// Rewrites the `port` param of announce requests.
#[derive(Debug, Clone)]
pub struct AnnouncePortRewriter {
    port_state: Arc<PortState>,
}

impl AnnouncePortRewriter {
    #[must_use]
    pub fn new(port_state: Arc<PortState>) -> Self {
        Self { port_state }
    }

    /// Returns the rewritten URI or `None` when `uri` is not an announce
    /// request.
    #[must_use]
    pub fn rewrite_uri(&self, uri: &Uri) -> Option<Uri> {
        let raw_query = uri.query()?;

        let mut query = raw_query.parse::<Query>().unwrap_or_else(|never| match never {});

        if !query.contains_all(&ANNOUNCE_PARAMS) {
            return None;
        }

        let new_port = self.port_state.get().to_string();

        let detected_port = query.replace_first(PORT_PARAM, &new_port)?;

        debug!(target: PROXY_LOG_TARGET, "Detected port: {detected_port}, change to {new_port}");

        let path_and_query = format!("{}?{query}", uri.path());

        let mut parts = uri.clone().into_parts();

        parts.path_and_query = match PathAndQuery::try_from(path_and_query) {
            Ok(path_and_query) => Some(path_and_query),
            Err(err) => {
                warn!(target: PROXY_LOG_TARGET, %uri, %err, "unable to rebuild the announce url, forwarding it unchanged");
                return None;
            }
        };

        match Uri::from_parts(parts) {
            Ok(rewritten) => Some(rewritten),
            Err(err) => {
                warn!(target: PROXY_LOG_TARGET, %uri, %err, "unable to rebuild the announce url, forwarding it unchanged");
                None
            }
        }
    }
}

impl RequestInterceptor for AnnouncePortRewriter {
    fn on_request(&self, mut request: request::Parts) -> request::Parts {
        let Some(rewritten) = self.rewrite_uri(&request.uri) else {
            return request;
        };

        resync_host_header(&mut request, &rewritten);

        request.uri = rewritten;

        request
    }

    fn on_response(&self, request: &request::Parts, response: &response::Parts) {
        if is_announce(&request.uri) {
            debug!(target: PROXY_LOG_TARGET, uri = %request.uri, status = %response.status, "announce response");
        }
    }
}

/// Returns `true` when the URI query has all the [`ANNOUNCE_PARAMS`].
#[must_use]
pub fn is_announce(uri: &Uri) -> bool {
    uri.query()
        .and_then(|raw_query| raw_query.parse::<Query>().ok())
        .is_some_and(|query| query.contains_all(&ANNOUNCE_PARAMS))
}

/// A `Host` header that was derived from the original URL authority follows
/// the authority of the rewritten URL. A `Host` header that did not match
/// the original URL is left as the client sent it.
fn resync_host_header(request: &mut request::Parts, rewritten: &Uri) {
    let (Some(original), Some(new)) = (request.uri.authority(), rewritten.authority()) else {
        return;
    };

    let derived_from_url = request
        .headers
        .get(header::HOST)
        .is_some_and(|host| host.as_bytes().eq_ignore_ascii_case(original.as_str().as_bytes()));

    if derived_from_url && original != new {
        if let Ok(host) = HeaderValue::from_str(new.as_str()) {
            request.headers.insert(header::HOST, host);
        }
    }
}
