//! Configurations used by the tests.
use std::net::{IpAddr, Ipv4Addr};

use torrust_announce_proxy_configuration::{Configuration, Threshold};

use crate::network::free_port;

/// This configuration is used for testing. It binds the proxy to a random
/// port and the control API to a port that was free a moment ago, so they
/// do not collide if you run more than one service at the same time.
///
/// The control API port is a fixed value (not `0`) because the notifier
/// needs to know it before probing.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration::default();

    config.logging.threshold = Threshold::Off; // Change to `debug` for tests debugging

    config.settings.bind_host = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.settings.control_api_port = free_port();
    config.settings.proxy_listen_port = 0;
    config.settings.worker_shutdown_timeout_secs = 2;

    config.notifier.connect_timeout_ms = 500;

    config
}

/// Ephemeral configuration with both listeners on random ports.
#[must_use]
pub fn ephemeral_with_random_api_port() -> Configuration {
    let mut config = ephemeral();

    config.settings.control_api_port = 0;

    config
}

/// Ephemeral configuration with a given seed for the public port.
#[must_use]
pub fn ephemeral_with_default_public_port(port: u16) -> Configuration {
    let mut config = ephemeral();

    config.settings.default_public_port = port;

    config
}
