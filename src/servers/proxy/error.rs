use std::net::SocketAddr;

use hyper::http::Uri;
use hyper::StatusCode;
use thiserror::Error;

/// Errors of the announce proxy.
///
/// The first group is returned by the [`ProxyServer`](super::server::ProxyServer)
/// lifecycle. The second group only happens while proxying one request and
/// it is turned into an error response for that request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to bind the announce proxy to {addr}: {source}")]
    UnableToBind { addr: SocketAddr, source: std::io::Error },

    #[error("Unable to get the local address of the announce proxy: {source}")]
    UnableToGetLocalAddress { source: std::io::Error },

    #[error("The announce proxy task failed: {source}")]
    TaskFailed { source: tokio::task::JoinError },

    #[error("The request has no target host: {uri}")]
    MissingTarget { uri: Uri },

    #[error("The request target is not a valid url: {source}")]
    InvalidTarget { source: hyper::http::Error },

    #[error("Unable to forward the request to {target}: {source}")]
    Upstream {
        target: Uri,
        source: hyper_util::client::legacy::Error,
    },

    #[error("Unable to open a tunnel to {target}: {source}")]
    Tunnel { target: String, source: std::io::Error },
}

impl Error {
    /// The status code of the response sent to the proxy client when
    /// the request fails.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingTarget { .. } | Error::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            Error::Upstream { .. } | Error::Tunnel { .. } => StatusCode::BAD_GATEWAY,
            Error::UnableToBind { .. } | Error::UnableToGetLocalAddress { .. } | Error::TaskFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
