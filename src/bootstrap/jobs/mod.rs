//! Application jobs launchers.
//!
//! The service runs two jobs:
//!
//! 1. The proxy worker: the announce proxy in a child process.
//! 2. The control API.
//!
//! The worker is started first so the control API can report the port the
//! proxy is bound to.
pub mod control_api;
pub mod proxy_worker;
