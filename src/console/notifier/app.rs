//! Entry point of the port change notifier.
//!
//! ```text
//! port_changed_notifier tcp 192.168.1.10 6881 203.0.113.7 51413
//! ```
//!
//! The exit code is `0` when the port was delivered (or a new instance was
//! launched) and `1` otherwise.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use torrust_announce_proxy_configuration::Configuration;
use tracing::{error, info};

use super::client::{ControlClient, HttpControlClient};
use super::probe::{probe, InstanceState};
use super::spawner::{DetachedSpawner, InstanceSpawner};
use super::{web_ui, Error, Outcome, NOTIFIER_LOG_TARGET};
use crate::bootstrap;
use crate::bootstrap::logging::Output;
use crate::core::port_state::Port;

/// Sends a new public port to the running announce proxy, or launches one.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Protocol of the port mapping, `tcp` or `udp`.
    pub protocol: String,

    /// Private IP of the mapping.
    pub private_ip: String,

    /// Private port of the mapping.
    #[arg(allow_hyphen_values = true)]
    pub private_port: String,

    /// Public IP of the mapping.
    pub public_ip: String,

    /// Public port of the mapping. Validated by the notifier, so a negative
    /// value is reported as an invalid port instead of an unknown flag.
    #[arg(allow_hyphen_values = true)]
    pub public_port: String,
}

/// # Errors
///
/// Will return `Err` if the new port could not be delivered.
pub async fn run() -> Result<Outcome, Error> {
    let args = Args::parse();

    let (config, load_error) = bootstrap::config::initialize_configuration();

    bootstrap::logging::setup(config.logging.threshold, Output::Stderr);

    if let Some(err) = load_error {
        error!(target: NOTIFIER_LOG_TARGET, "{err}. Using the default configuration");
    }

    let result = execute(&args, &config).await;

    match &result {
        Ok(outcome) => info!(target: NOTIFIER_LOG_TARGET, "{outcome}"),
        Err(err) => error!(target: NOTIFIER_LOG_TARGET, %err, "Unable to deliver the new public port"),
    }

    result
}

/// # Errors
///
/// Will return `Err` if the public port is invalid, before any side effect,
/// or if the new port could not be delivered.
pub async fn execute(args: &Args, config: &Configuration) -> Result<Outcome, Error> {
    let port = args
        .public_port
        .parse::<Port>()
        .map_err(|source| Error::InvalidPublicPort { source })?;

    info!(
        target: NOTIFIER_LOG_TARGET,
        protocol = %args.protocol,
        private = %format!("{}:{}", args.private_ip, args.private_port),
        public = %format!("{}:{}", args.public_ip, args.public_port),
        "Port mapping changed"
    );

    let timeout = config.notifier.connect_timeout();

    if config.web_ui.enabled {
        return web_ui::deliver(&config.web_ui, &args.public_ip, port, timeout).await;
    }

    let addr = control_api_address(config);

    let client = HttpControlClient::new(addr, timeout)?;

    let spawner = DetachedSpawner::from_config(config);

    notify(port, addr, timeout, &client, &spawner).await
}

/// Sends `port` to the instance listening on `addr`, or launches a new
/// instance when nothing listens there.
///
/// # Errors
///
/// Will return `Err` if the probe fails for a reason other than a refused
/// connection, or if the call or the launch fails.
pub async fn notify<C, S>(port: Port, addr: SocketAddr, timeout: Duration, client: &C, spawner: &S) -> Result<Outcome, Error>
where
    C: ControlClient + ?Sized,
    S: InstanceSpawner + ?Sized,
{
    match probe(addr, timeout).await? {
        InstanceState::Running => {
            info!(target: NOTIFIER_LOG_TARGET, "Instance running on {addr}, sending port {port}");

            client.port_changed(port).await?;

            Ok(Outcome::Updated { port: port.get() })
        }
        InstanceState::NotRunning => {
            info!(target: NOTIFIER_LOG_TARGET, "No instance running on {addr}, launching a new one");

            let pid = spawner.spawn(port)?;

            Ok(Outcome::Spawned { pid })
        }
    }
}

/// The local address of the control API. An unspecified bind host is
/// reached through localhost.
#[must_use]
pub fn control_api_address(config: &Configuration) -> SocketAddr {
    let host = match config.settings.bind_host {
        host if host.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        host => host,
    };

    SocketAddr::new(host, config.settings.control_api_port)
}
