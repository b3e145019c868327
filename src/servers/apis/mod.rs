//! The control API.
//!
//! > **NOTICE**: This API has no authentication. It is bound to `127.0.0.1`
//! by default and it should never be exposed to other hosts.
//!
//! It is the only writer of the current public port. The port change
//! notifier calls it every time the NAT port changes.
//!
//! # Configuration
//!
//! ```toml
//! [settings]
//! controlApiPort = 8000
//! bindHost = "127.0.0.1"
//! ```
//!
//! When the service starts you will see:
//!
//! ```text
//! 2024-06-25T12:36:25.025527Z  INFO CONTROL API: Started on: http://127.0.0.1:8000
//! ```
//!
//! # Endpoints
//!
//! ## Change the public port
//!
//! `GET /portChanged?new_port=<port>`
//!
//! ```bash
//! $ curl -s "http://127.0.0.1:8000/portChanged?new_port=51413"
//! {"status":"success","message":"Port switched to 51413"}
//! ```
//!
//! A port out of the `1..=65535` range, not numeric, or missing is rejected
//! with `400 Bad Request` and the current port is not changed:
//!
//! ```bash
//! $ curl -s "http://127.0.0.1:8000/portChanged?new_port=70000"
//! {"status":"error","message":"Invalid port: 70000, the port must be between 1-65535"}
//! ```
//!
//! ## Status
//!
//! `GET /status`
//!
//! ```bash
//! $ curl -s "http://127.0.0.1:8000/status"
//! {"currentPort":51413,"proxyPort":8080,"apiPort":8000}
//! ```
//!
//! | Field         | Description
//! |---------------|-------------------------------------------------
//! | `currentPort` | The public port written into announce requests.
//! | `proxyPort`   | The port the announce proxy listens on.
//! | `apiPort`     | The port of this API.
pub mod handlers;
pub mod resources;
pub mod responses;
pub mod routes;
pub mod server;

pub const API_LOG_TARGET: &str = "CONTROL API";
