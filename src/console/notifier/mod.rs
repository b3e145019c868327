//! Port change notifier.
//!
//! A short-lived program invoked by the NAT port mapping tool every time the
//! public port changes:
//!
//! ```text
//! port_changed_notifier <protocol> <private_ip> <private_port> <public_ip> <public_port>
//! ```
//!
//! For example:
//!
//! ```text
//! port_changed_notifier tcp 192.168.1.10 6881 203.0.113.7 51413
//! ```
//!
//! It probes the control API port on the local host:
//!
//! - An instance is running: it sends the new port to the running instance
//!   with `GET /portChanged?new_port=<public_port>`.
//! - Nothing is listening: it launches a new service instance, detached from
//!   the notifier, seeded with the public port.
//! - Any other probe failure, including a timeout, is an error. The notifier
//!   never launches a second instance when it can't tell if one is running.
//!
//! When the `[webui]` section is enabled it updates the torrent client
//! preferences through its WebUI instead. See [`web_ui`].
pub mod app;
pub mod client;
pub mod probe;
pub mod spawner;
pub mod web_ui;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use derive_more::Display;
use thiserror::Error;

use crate::core::port_state::ParsePortError;

pub const NOTIFIER_LOG_TARGET: &str = "NOTIFIER";

/// What the notifier did.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The port was sent to the running instance.
    #[display("public port {port} sent to the running instance")]
    Updated { port: u16 },
    /// A new instance was launched.
    #[display("new instance launched with pid {pid}")]
    Spawned { pid: u32 },
    /// The torrent client preferences were updated through its WebUI.
    #[display("torrent client announce port set to {port}")]
    WebUiUpdated { port: u16 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid public port: {source}")]
    InvalidPublicPort { source: ParsePortError },

    #[error("Unable to probe the control API at {addr}: {source}")]
    Probe { addr: SocketAddr, source: std::io::Error },

    #[error("Timeout probing the control API at {addr} after {timeout:?}")]
    ProbeTimeout { addr: SocketAddr, timeout: Duration },

    #[error("Unable to build the http client: {source}")]
    HttpClient { source: reqwest::Error },

    #[error("Unable to call {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Unexpected response from {url}: {status} {body}")]
    UnexpectedResponse { url: String, status: u16, body: String },

    #[error("Unable to launch the service {program:?}: {source}")]
    Spawn { program: PathBuf, source: std::io::Error },

    #[error("Invalid WebUI url {url}: {source}")]
    InvalidWebUiUrl { url: String, source: url::ParseError },

    #[error("The WebUI rejected the login for the user {username}")]
    WebUiLoginRejected { username: String },

    #[error("Invalid WebUI preferences: {source}")]
    InvalidPreferences { source: serde_json::Error },
}
