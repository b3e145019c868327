//! The current public (NAT) port.
//!
//! [`PortState`] is the single value the whole application is about. The
//! control API is the only writer, the announce rewriter is the only reader.
//!
//! ```text
//! control API --set--> PortState (service process) --relay--> PortState (proxy worker) <--get-- rewriter
//! ```
//!
//! Reads are a single atomic load, so a reader never observes a partial
//! value. Writes are validated before they are stored: a rejected value
//! leaves the state untouched.
//!
//! The proxy runs in a separate OS process. The service process owns the
//! authoritative cell and every committed value is published through a
//! [`tokio::sync::watch`] channel. The worker supervisor subscribes to it
//! and forwards each value to the worker, which keeps a replica that it
//! only writes from its control channel. Last write wins; readers simply
//! call [`PortState::get`] again on each use.
use std::num::{NonZeroU16, ParseIntError};
use std::str::FromStr;
use std::sync::atomic::{AtomicU16, Ordering};

use thiserror::Error;
use tokio::sync::watch;

/// Public port used when nothing else was provided.
pub const FALLBACK_PUBLIC_PORT: Port = Port(match NonZeroU16::new(25565) {
    Some(port) => port,
    None => panic!("the fallback port should not be zero"),
});

/// A valid TCP port: `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(NonZeroU16);

impl Port {
    /// Returns `None` for port `0`.
    #[must_use]
    pub fn new(port: u16) -> Option<Self> {
        NonZeroU16::new(port).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.get()
    }
}

/// The value is outside the `1..=65535` range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid port: {value}, the port must be between 1-65535")]
pub struct InvalidPort {
    pub value: i64,
}

impl TryFrom<i64> for Port {
    type Error = InvalidPort;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(InvalidPort { value })
    }
}

/// Error parsing a [`Port`] from a string, for example from a URL query
/// param or a command line argument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePortError {
    #[error("Invalid port: {raw}, the port must be between 1-65535")]
    NotANumber { raw: String, source: ParseIntError },

    #[error(transparent)]
    OutOfRange(#[from] InvalidPort),
}

impl FromStr for Port {
    type Err = ParsePortError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().parse::<i64>().map_err(|source| ParsePortError::NotANumber {
            raw: raw.to_owned(),
            source,
        })?;

        Ok(Port::try_from(value)?)
    }
}

/// The current public port.
#[derive(Debug)]
pub struct PortState {
    current: AtomicU16,
    commits: watch::Sender<u16>,
}

impl PortState {
    #[must_use]
    pub fn new(initial: Port) -> Self {
        let (commits, _) = watch::channel(initial.get());

        Self {
            current: AtomicU16::new(initial.get()),
            commits,
        }
    }

    /// Returns the last committed port. It never blocks.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.current.load(Ordering::Acquire)
    }

    /// Validates and commits a new port.
    ///
    /// # Errors
    ///
    /// Will return [`InvalidPort`] if `value` is not in `1..=65535`. The
    /// state is not modified in that case.
    pub fn set(&self, value: i64) -> Result<(), InvalidPort> {
        let port = Port::try_from(value)?;

        self.commit(port);

        Ok(())
    }

    /// Commits an already validated port.
    ///
    /// The store happens under the lock of the commits channel, so the cell
    /// and the last published value always hold the same port.
    pub fn commit(&self, port: Port) {
        self.commits.send_modify(|published| {
            self.current.store(port.get(), Ordering::Release);
            *published = port.get();
        });
    }

    /// A receiver that is notified with every committed port. Used to
    /// replicate the value into other processes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u16> {
        self.commits.subscribe()
    }
}

impl Default for PortState {
    fn default() -> Self {
        Self::new(FALLBACK_PUBLIC_PORT)
    }
}
