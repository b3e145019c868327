//! Torrust Announce Proxy application.
//!
//! The application is a container for the two jobs of the service:
//!
//! - The proxy worker. Optional: when it can not be started the service
//!   keeps running without it.
//! - The control API. Required: the service does not start without it.
//!
//! Both jobs share the same [`PortState`]. The control API writes it and the
//! worker supervisor relays it to the worker.
use std::path::PathBuf;
use std::sync::Arc;

use torrust_announce_proxy_configuration::Configuration;
use tracing::{error, info, warn};

use crate::bootstrap::jobs::{control_api, proxy_worker};
use crate::core::port_state::PortState;
use crate::servers::apis::server::{Error, RunningApiServer};
use crate::servers::proxy::worker::supervisor::{RunningWorker, WorkerLauncher};

/// The running jobs.
pub struct Jobs {
    pub control_api: RunningApiServer,
    pub proxy_worker: Option<RunningWorker>,
}

impl Jobs {
    /// Resolves when the control API is no longer serving.
    pub async fn halted(&self) {
        self.control_api.halted().await;
    }

    /// Stops the control API and the proxy worker.
    ///
    /// The worker is always stopped, even if the control API fails to stop.
    pub async fn stop(self) {
        match self.control_api.stop().await {
            Ok(_) => info!("Control API stopped"),
            Err(err) => error!(%err, "Unable to stop the control API"),
        }

        if let Some(worker) = self.proxy_worker {
            if worker.is_finished() {
                warn!(pid = ?worker.pid, "The proxy worker had already exited, releasing it");
            }

            if let Err(err) = worker.stop().await {
                error!(%err, "Unable to stop the proxy worker");
            }
        }
    }
}

/// It starts the jobs with the worker installed next to the running
/// executable.
///
/// # Errors
///
/// Will return `Err` if the control API can not be started.
pub async fn start(config: &Configuration, port_state: Arc<PortState>) -> Result<Jobs, Error> {
    start_with_worker(config, port_state, WorkerLauncher::default_program()).await
}

/// It starts the jobs with the worker executable `worker_program`.
///
/// # Errors
///
/// Will return `Err` if the control API can not be started. The worker is
/// stopped in that case.
pub async fn start_with_worker(
    config: &Configuration,
    port_state: Arc<PortState>,
    worker_program: PathBuf,
) -> Result<Jobs, Error> {
    let proxy_worker = proxy_worker::start_job(config, &port_state, worker_program).await;

    let proxy_port = proxy_worker
        .as_ref()
        .map_or(config.settings.proxy_listen_port, |worker| worker.binding.port());

    let control_api = match control_api::start_job(config, port_state, proxy_port).await {
        Ok(control_api) => control_api,
        Err(err) => {
            if let Some(worker) = proxy_worker {
                if let Err(err) = worker.stop().await {
                    error!(%err, "Unable to stop the proxy worker");
                }
            }
            return Err(err);
        }
    };

    Ok(Jobs {
        control_api,
        proxy_worker,
    })
}
