//! Proxy worker job starter.
//!
//! A worker that can not be started is not fatal: the service keeps the
//! control API running, so port changes are still recorded and the status
//! can still be queried.
use std::path::PathBuf;

use torrust_announce_proxy_configuration::Configuration;
use tracing::error;

use crate::core::port_state::PortState;
use crate::servers::proxy::worker::supervisor::{RunningWorker, WorkerLauncher};
use crate::servers::proxy::worker::WORKER_LOG_TARGET;

/// It starts the proxy worker with the executable `program`.
pub async fn start_job(config: &Configuration, port_state: &PortState, program: PathBuf) -> Option<RunningWorker> {
    let launcher = WorkerLauncher::new(
        program,
        config.settings.proxy_bind_address(),
        config.logging.threshold,
        config.settings.worker_shutdown_timeout(),
    );

    match launcher.start(port_state).await {
        Ok(worker) => Some(worker),
        Err(err) => {
            error!(target: WORKER_LOG_TARGET, %err, "Unable to start the proxy worker. The control API keeps running without it");
            None
        }
    }
}
