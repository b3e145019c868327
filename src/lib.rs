//! **Torrust Announce Proxy** keeps the port a `BitTorrent` client announces
//! to its trackers in sync with a public NAT port that can change at any
//! time.
//!
//! The torrent client sends its tracker requests through a local forward
//! proxy. Every announce request, a request whose query carries the
//! `info_hash`, `peer_id` and `port` params, gets its `port` param replaced
//! with the current public port. Everything else is forwarded untouched.
//!
//! ```text
//!                        +---------------- service process ----------------+
//!  NAT port mapping      |                                                 |
//!  tool (natpmp, upnp)   |   control API  ---set--->  PortState            |
//!        |               |   /portChanged                |                 |
//!        v               |   /status                     | relay           |
//!  port_changed_notifier --------^                       v                 |
//!                        |                     proxy worker process        |
//!                        |   torrent client ---> announce proxy ---> tracker
//!                        +-------------------------------------------------+
//! ```
//!
//! # Components
//!
//! - [`core::port_state`]: the current public port.
//! - [`servers::proxy`]: the forward proxy and the announce port rewriter. It
//!   runs in a child process, the proxy worker, so a crash in the proxy
//!   doesn't take the control API down.
//! - [`servers::apis`]: the control API.
//! - [`console::notifier`]: the program the NAT port mapping tool runs when
//!   the public port changes. It sends the port to the running service or
//!   launches a new one.
//!
//! # Executables
//!
//! | Binary                   | Purpose                                          |
//! |--------------------------|--------------------------------------------------|
//! | `torrust-announce-proxy` | The service: control API and proxy worker.       |
//! | `announce_proxy_worker`  | The proxy worker. Launched by the service.       |
//! | `port_changed_notifier`  | Delivers a new public port.                      |
//!
//! All of them must be installed in the same directory, next to the
//! optional `config.toml` file.
//!
//! # Usage
//!
//! ```text
//! torrust-announce-proxy 51413
//! ```
//!
//! Then configure `http://127.0.0.1:8080` as the HTTP proxy of the torrent
//! client for tracker connections. When the public port changes:
//!
//! ```text
//! port_changed_notifier tcp 192.168.1.10 6881 203.0.113.7 51414
//! ```
//!
//! Refer to the [configuration crate](https://docs.rs/torrust-announce-proxy-configuration)
//! for the configuration options.
pub mod app;
pub mod bootstrap;
pub mod console;
pub mod core;
pub mod servers;
