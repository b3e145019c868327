//! Control API job starter.
//!
//! The [`control_api::start_job`](crate::bootstrap::jobs::control_api::start_job)
//! function starts the control API on the configured `controlApiPort`.
//!
//! Refer to the [control API documentation](crate::servers::apis) for more
//! information.
use std::sync::Arc;

use torrust_announce_proxy_configuration::Configuration;

use crate::core::port_state::PortState;
use crate::servers::apis::server::{ApiServer, Error, Launcher, RunningApiServer};

/// It starts the control API.
///
/// # Errors
///
/// Will return `Err` if the API can not bind to its port. Usually because
/// another instance of the service is already running.
pub async fn start_job(
    config: &Configuration,
    port_state: Arc<PortState>,
    proxy_port: u16,
) -> Result<RunningApiServer, Error> {
    let launcher = Launcher::new(
        config.settings.control_api_bind_address(),
        config.settings.worker_shutdown_timeout(),
    );

    ApiServer::new(launcher).start(port_state, proxy_port).await
}
