//! Messages between the supervisor and the worker.
//!
//! One JSON document per line:
//!
//! ```text
//! supervisor -> worker (stdin):  {"set_port":{"port":51413}}
//!                                "shutdown"
//! worker -> supervisor (stdout): {"started":{"address":"127.0.0.1:8080"}}
//! ```
use std::net::SocketAddr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt as _};

use super::Error;

/// Sent by the supervisor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// A new public port was committed.
    SetPort { port: u16 },
    /// Stop the proxy and exit.
    Shutdown,
}

/// Sent by the worker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// The proxy is accepting connections on `address`.
    Started { address: SocketAddr },
}

/// Encodes a message as one line.
///
/// # Errors
///
/// Will return `Err` if the message can not be serialized.
pub fn encode<T: Serialize>(message: &T) -> Result<String, Error> {
    let mut line = serde_json::to_string(message).map_err(|source| Error::UnableToEncode { source })?;
    line.push('\n');
    Ok(line)
}

/// Decodes one line.
///
/// # Errors
///
/// Will return `Err` if the line is not a valid message.
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, Error> {
    serde_json::from_str(line.trim()).map_err(|source| Error::UnexpectedMessage {
        line: line.to_owned(),
        source,
    })
}

/// Writes one message and flushes the writer.
///
/// # Errors
///
/// Will return `Err` if the message can not be encoded or written.
pub async fn send<T, W>(writer: &mut W, message: &T) -> Result<(), Error>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let line = encode(message)?;

    writer
        .write_all(line.as_bytes())
        .await
        .map_err(|source| Error::Channel { source })?;

    writer.flush().await.map_err(|source| Error::Channel { source })
}
