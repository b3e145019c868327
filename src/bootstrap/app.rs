//! Setup for the service process.
//!
//! It loads the configuration, initializes the logging and seeds the current
//! public port.
use std::sync::Arc;

use clap::Parser;
use torrust_announce_proxy_configuration::Configuration;
use tracing::{error, info, warn};

use crate::bootstrap;
use crate::bootstrap::logging::Output;
use crate::core::port_state::{Port, PortState, FALLBACK_PUBLIC_PORT};

/// Keeps the port in the `BitTorrent` announce requests in sync with the
/// public NAT port.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Initial public port. The configured `defaultPublicPort` is used when
    /// it is missing or invalid.
    pub port: Option<String>,
}

#[must_use]
pub fn setup(args: &Args) -> (Arc<Configuration>, Arc<PortState>) {
    let (configuration, load_error) = bootstrap::config::initialize_configuration();

    bootstrap::logging::setup(configuration.logging.threshold, Output::Stdout);

    if let Some(err) = load_error {
        warn!("{err}. Using the default configuration");
    }

    info!("Configuration:\n{}", configuration.to_masked_toml());

    let port_state = initialize_port_state(args.port.as_deref(), &configuration);

    (Arc::new(configuration), Arc::new(port_state))
}

/// The initial public port is the `seed` when it's a valid port, the
/// configured default otherwise.
#[must_use]
pub fn initialize_port_state(seed: Option<&str>, configuration: &Configuration) -> PortState {
    let default = default_public_port(configuration);

    let Some(seed) = seed else {
        warn!("No port parameter provided.");
        return PortState::new(default);
    };

    match seed.parse::<Port>() {
        Ok(port) => {
            info!("Initial public port: {port}");
            PortState::new(port)
        }
        Err(err) => {
            error!("{err}. Using the default public port {default}");
            PortState::new(default)
        }
    }
}

fn default_public_port(configuration: &Configuration) -> Port {
    Port::new(configuration.settings.default_public_port).unwrap_or_else(|| {
        warn!("Invalid defaultPublicPort 0. Using {FALLBACK_PUBLIC_PORT}");
        FALLBACK_PUBLIC_PORT
    })
}
