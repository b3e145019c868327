//! Logic to run the control API server.
//!
//! It contains two main structs: `ApiServer` and `Launcher`.
//!
//! The `ApiServer` struct is responsible for:
//! - Starting and stopping the server.
//! - Keeping the state of the server: `running` or `stopped`.
//!
//! `ApiServer` relies on a launcher to start the actual server.
//!
//! 1. `ApiServer::start` -> binds the socket and spawns a new asynchronous task.
//! 2. `Launcher::serve` -> serves the API on the spawned task until halted.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use derive_more::Constructor;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::handlers::ControlState;
use super::routes::router;
use super::API_LOG_TARGET;
use crate::core::port_state::PortState;
use crate::servers::logging::STARTED_ON;
use crate::servers::signals::{graceful_shutdown, Halted};

/// Errors that can occur when starting or stopping the API server.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to bind the control API to {addr}: {source}")]
    UnableToBind { addr: SocketAddr, source: std::io::Error },

    #[error("Unable to get the local address of the control API: {source}")]
    UnableToGetLocalAddress { source: std::io::Error },

    #[error("Unable to serve the control API: {source}")]
    UnableToServe { source: std::io::Error },

    #[error("The control API task failed: {source}")]
    TaskFailed { source: tokio::task::JoinError },
}

/// An API server controller with no API running.
#[allow(clippy::module_name_repetitions)]
pub type StoppedApiServer = ApiServer<Stopped>;

/// An API server controller with a running API.
#[allow(clippy::module_name_repetitions)]
pub type RunningApiServer = ApiServer<Running>;

/// The API server controller.
///
/// It's a state machine. The configuration, kept in the [`Launcher`], can
/// not be changed. Stopping a running server gives back the stopped server
/// with the same configuration.
#[allow(clippy::module_name_repetitions)]
pub struct ApiServer<S> {
    /// The state of the server: `running` or `stopped`.
    pub state: S,
}

/// A stopped API server state.
pub struct Stopped {
    launcher: Launcher,
}

/// A running API server state.
pub struct Running {
    /// The address where the server is bound.
    pub binding: SocketAddr,
    halt_task: oneshot::Sender<Halted>,
    halted: watch::Receiver<bool>,
    task: JoinHandle<Result<Launcher, Error>>,
}

impl ApiServer<Stopped> {
    #[must_use]
    pub fn new(launcher: Launcher) -> Self {
        Self {
            state: Stopped { launcher },
        }
    }

    /// It starts the server and returns an `ApiServer` controller in
    /// `running` state.
    ///
    /// # Errors
    ///
    /// It would return an error if the server can not bind to the
    /// configured address.
    pub async fn start(self, port_state: Arc<PortState>, proxy_port: u16) -> Result<ApiServer<Running>, Error> {
        let launcher = self.state.launcher;

        let listener = std::net::TcpListener::bind(launcher.bind_to).map_err(|source| Error::UnableToBind {
            addr: launcher.bind_to,
            source,
        })?;

        let binding = listener
            .local_addr()
            .map_err(|source| Error::UnableToGetLocalAddress { source })?;

        let state = Arc::new(ControlState::new(port_state, proxy_port, binding.port()));

        let (tx_halt, rx_halt) = oneshot::channel::<Halted>();
        let (tx_halted, rx_halted) = watch::channel(false);

        let task = tokio::spawn(async move {
            let result = launcher.serve(listener, state, rx_halt).await;
            tx_halted.send_replace(true);
            result
        });

        info!(target: API_LOG_TARGET, "{STARTED_ON}: http://{binding}");

        Ok(ApiServer {
            state: Running {
                binding,
                halt_task: tx_halt,
                halted: rx_halted,
                task,
            },
        })
    }
}

impl ApiServer<Running> {
    /// Resolves when the server is no longer serving: it was halted, it
    /// received a termination signal, or it failed.
    pub async fn halted(&self) {
        let mut halted = self.state.halted.clone();

        // An error means the task is gone, which also means it is halted.
        let _ = halted.wait_for(|halted| *halted).await;
    }

    /// It stops the server and returns an `ApiServer` controller in
    /// `stopped` state.
    ///
    /// # Errors
    ///
    /// It would return an error if the server failed while serving.
    pub async fn stop(self) -> Result<ApiServer<Stopped>, Error> {
        if self.state.halt_task.send(Halted::Normal).is_err() {
            debug!(target: API_LOG_TARGET, binding = %self.state.binding, "the control API was already halted");
        }

        let launcher = self.state.task.await.map_err(|source| Error::TaskFailed { source })??;

        Ok(ApiServer {
            state: Stopped { launcher },
        })
    }
}

/// Knows how to serve the API.
#[derive(Constructor, Clone, Debug)]
pub struct Launcher {
    pub bind_to: SocketAddr,
    /// How long open connections are given to finish after halting.
    pub shutdown_timeout: Duration,
}

impl Launcher {
    async fn serve(
        self,
        listener: std::net::TcpListener,
        state: Arc<ControlState>,
        rx_halt: oneshot::Receiver<Halted>,
    ) -> Result<Self, Error> {
        let handle = axum_server::Handle::new();

        let binding = SocketAddr::new(self.bind_to.ip(), state.api_port);

        tokio::spawn(graceful_shutdown(
            handle.clone(),
            rx_halt,
            format!("Halting the control API bound to: {binding}"),
            self.shutdown_timeout,
        ));

        listener
            .set_nonblocking(true)
            .map_err(|source| Error::UnableToServe { source })?;

        axum_server::from_tcp(listener)
            .handle(handle)
            .serve(router(state).into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|source| Error::UnableToServe { source })?;

        Ok(self)
    }
}
