//! Servers. Services that can be started and stopped.
pub mod apis;
pub mod logging;
pub mod proxy;
pub mod signals;
