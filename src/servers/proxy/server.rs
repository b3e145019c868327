//! The announce proxy server.
//!
//! A [`ProxyServer`] is a state machine: a [`StoppedProxyServer`] keeps the
//! [`Launcher`] with the configuration, and starting it returns a
//! [`RunningProxyServer`] with the bound address. Stopping a running server
//! gives the stopped server back, so it can be started again with the same
//! configuration.
//!
//! ```text
//! ProxyServer<Stopped> --start--> ProxyServer<Running> --stop--> ProxyServer<Stopped>
//! ```
//!
//! Every accepted connection is served on its own task with the `hyper`
//! HTTP/1.1 server. Upgrades are enabled so `CONNECT` tunnels work.
use std::net::SocketAddr;
use std::sync::Arc;

use derive_more::Constructor;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::error::Error;
use super::forward::{proxy_request, upstream_client, UpstreamClient};
use super::interceptor::InterceptorChain;
use super::PROXY_LOG_TARGET;
use crate::servers::logging::STARTED_ON;
use crate::servers::signals::{shutdown_signal_with_message, Halted};

/// A proxy server controller with no proxy running.
#[allow(clippy::module_name_repetitions)]
pub type StoppedProxyServer = ProxyServer<Stopped>;

/// A proxy server controller with a running proxy.
#[allow(clippy::module_name_repetitions)]
pub type RunningProxyServer = ProxyServer<Running>;

/// The proxy server controller.
#[allow(clippy::module_name_repetitions)]
pub struct ProxyServer<S> {
    /// The state of the server: `running` or `stopped`.
    pub state: S,
}

/// A stopped proxy server state.
pub struct Stopped {
    launcher: Launcher,
}

/// A running proxy server state.
pub struct Running {
    /// The address where the server is bound.
    pub binding: SocketAddr,
    halt_task: oneshot::Sender<Halted>,
    task: JoinHandle<Launcher>,
}

/// Knows how to run the proxy: where to listen and which interceptors to
/// apply.
#[derive(Constructor, Clone, Debug)]
pub struct Launcher {
    pub bind_to: SocketAddr,
    pub interceptors: InterceptorChain,
}

impl ProxyServer<Stopped> {
    #[must_use]
    pub fn new(launcher: Launcher) -> Self {
        Self {
            state: Stopped { launcher },
        }
    }

    /// It binds the listener and starts serving on a new task.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the proxy can not bind to the configured address.
    pub async fn start(self) -> Result<ProxyServer<Running>, Error> {
        let launcher = self.state.launcher;

        let listener = TcpListener::bind(launcher.bind_to)
            .await
            .map_err(|source| Error::UnableToBind {
                addr: launcher.bind_to,
                source,
            })?;

        let binding = listener
            .local_addr()
            .map_err(|source| Error::UnableToGetLocalAddress { source })?;

        let (tx_halt, rx_halt) = oneshot::channel::<Halted>();

        info!(target: PROXY_LOG_TARGET, "{STARTED_ON}: http://{binding}");

        let task = tokio::spawn(launcher.run_with_graceful_shutdown(listener, rx_halt));

        Ok(ProxyServer {
            state: Running {
                binding,
                halt_task: tx_halt,
                task,
            },
        })
    }
}

impl ProxyServer<Running> {
    /// It stops accepting connections and returns the stopped server.
    ///
    /// Connections that are already open are served until they close.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the server task panicked.
    pub async fn stop(self) -> Result<ProxyServer<Stopped>, Error> {
        if self.state.halt_task.send(Halted::Normal).is_err() {
            debug!(target: PROXY_LOG_TARGET, binding = %self.state.binding, "the proxy was already halted");
        }

        let launcher = self.state.task.await.map_err(|source| Error::TaskFailed { source })?;

        Ok(ProxyServer {
            state: Stopped { launcher },
        })
    }
}

impl Launcher {
    async fn run_with_graceful_shutdown(self, listener: TcpListener, rx_halt: oneshot::Receiver<Halted>) -> Self {
        let client = upstream_client();
        let interceptors = Arc::new(self.interceptors.clone());

        let binding = listener.local_addr().map_or_else(|_| self.bind_to, |addr| addr);

        let halt = shutdown_signal_with_message(rx_halt, format!("Halting the announce proxy bound to: {binding}"));
        tokio::pin!(halt);

        loop {
            tokio::select! {
                () = &mut halt => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        trace!(target: PROXY_LOG_TARGET, %peer, "connection accepted");
                        tokio::spawn(serve_connection(stream, peer, interceptors.clone(), client.clone()));
                    }
                    Err(err) => warn!(target: PROXY_LOG_TARGET, %err, "unable to accept a connection"),
                }
            }
        }

        self
    }
}

async fn serve_connection(stream: TcpStream, peer: SocketAddr, interceptors: Arc<InterceptorChain>, client: UpstreamClient) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |request| proxy_request(request, interceptors.clone(), client.clone()));

    if let Err(err) = http1::Builder::new()
        .preserve_header_case(true)
        .title_case_headers(true)
        .serve_connection(io, service)
        .with_upgrades()
        .await
    {
        debug!(target: PROXY_LOG_TARGET, %peer, %err, "connection closed with error");
    }
}
