//! The announce proxy.
//!
//! An HTTP/1.1 forward proxy placed between a `BitTorrent` client and the
//! trackers it announces to. Announce requests get their `port` param
//! replaced with the current public port, everything else is forwarded as it
//! is:
//!
//! ```text
//! torrent client --> announce proxy --(port rewritten)--> tracker
//!                          ^
//!                          | current public port
//!                      PortState
//! ```
//!
//! Modules:
//!
//! - [`query`]: a lossless URL query.
//! - [`interceptor`]: the hook the proxy calls for every request.
//! - [`announce`]: the interceptor that rewrites the announce port.
//! - [`forward`]: forwarding and tunnelling.
//! - [`server`]: the proxy server.
//! - [`worker`]: runs the proxy in a child process.
//!
//! HTTPS trackers are reached through `CONNECT` tunnels that are not
//! decrypted, so their announce requests keep the port sent by the client.
pub mod announce;
pub mod error;
pub mod forward;
pub mod interceptor;
pub mod query;
pub mod server;
pub mod worker;

pub use error::Error;

pub const PROXY_LOG_TARGET: &str = "ANNOUNCE PROXY";
