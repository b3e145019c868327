//! The proxy worker.
//!
//! The announce proxy does not run in the service process. It runs in a
//! child process, the worker, so a crash while proxying can not take down
//! the control API.
//!
//! ```text
//!             service process                         worker process
//! +----------------------------------+     +------------------------------+
//! | control API --> PortState        |     |                              |
//! |                    |             |     |                              |
//! |               supervisor --stdin-+---->| PortState replica            |
//! |                    ^             |     |   ^                          |
//! |                    +------stdout-+-----| announce proxy (interceptor) |
//! +----------------------------------+     +------------------------------+
//! ```
//!
//! The service process owns the authoritative [`PortState`](crate::core::port_state::PortState).
//! The [`supervisor`] subscribes to it and sends every committed port to the
//! worker as a [`Command`](channel::Command). The worker keeps a replica that
//! only the command reader writes. The worker reports the address it is
//! bound to with an [`Event`](channel::Event).
//!
//! The worker logs to `stderr`. Its `stdout` is reserved for events.
pub mod channel;
pub mod process;
pub mod supervisor;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const WORKER_LOG_TARGET: &str = "PROXY WORKER";

/// Errors of the proxy worker and its supervisor.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to spawn the proxy worker {program:?}: {source}")]
    UnableToSpawn { program: PathBuf, source: std::io::Error },

    #[error("The proxy worker has no {stream} pipe")]
    MissingPipe { stream: &'static str },

    #[error("The proxy worker did not report it was started within {timeout:?}")]
    StartTimeout { timeout: Duration },

    #[error("The proxy worker exited before reporting it was started")]
    ExitedBeforeStart,

    #[error("Unexpected message from the proxy worker {line:?}")]
    UnexpectedMessage { line: String, source: serde_json::Error },

    #[error("Unable to encode a message for the proxy worker: {source}")]
    UnableToEncode { source: serde_json::Error },

    #[error("Proxy worker channel failure: {source}")]
    Channel { source: std::io::Error },

    #[error("The proxy worker supervisor task failed: {source}")]
    SupervisorFailed { source: tokio::task::JoinError },

    #[error(transparent)]
    Proxy(#[from] super::Error),
}
