use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ports and listeners of the service.
///
/// Both listeners bind to [`bind_host`](Settings::bind_host). Port `0` lets
/// the operating system pick a free port, which is only useful for tests
/// since the notifier needs to know the control API port in advance.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Port of the control API (`/portChanged` and `/status`).
    #[serde(default = "Settings::default_control_api_port", alias = "webApiBindPort")]
    pub control_api_port: u16,

    /// Port of the forward proxy the torrent client sends its tracker
    /// requests through.
    #[serde(default = "Settings::default_proxy_listen_port", alias = "mitmProxyBindPort")]
    pub proxy_listen_port: u16,

    /// Address both listeners are bound to.
    #[serde(default = "Settings::default_bind_host")]
    pub bind_host: IpAddr,

    /// Public port used until the first port change arrives, when the
    /// service is started without a seed port.
    #[serde(default = "Settings::default_public_port")]
    pub default_public_port: u16,

    /// Seconds to wait for the proxy worker to exit after asking it to stop.
    /// After that the worker is killed.
    #[serde(default = "Settings::default_worker_shutdown_timeout_secs")]
    pub worker_shutdown_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_api_port: Self::default_control_api_port(),
            proxy_listen_port: Self::default_proxy_listen_port(),
            bind_host: Self::default_bind_host(),
            default_public_port: Self::default_public_port(),
            worker_shutdown_timeout_secs: Self::default_worker_shutdown_timeout_secs(),
        }
    }
}

impl Settings {
    fn default_control_api_port() -> u16 {
        8000
    }

    fn default_proxy_listen_port() -> u16 {
        8080
    }

    fn default_bind_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn default_public_port() -> u16 {
        25565
    }

    fn default_worker_shutdown_timeout_secs() -> u64 {
        5
    }

    #[must_use]
    pub fn control_api_bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.control_api_port)
    }

    #[must_use]
    pub fn proxy_bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.proxy_listen_port)
    }

    #[must_use]
    pub fn worker_shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_shutdown_timeout_secs)
    }
}
