//! The worker side.
//!
//! It runs an announce proxy with a replica of the public port, reports the
//! bound address and then applies the commands sent by the supervisor until
//! it is told to stop.
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt as _, AsyncRead, AsyncWrite, BufReader};
use torrust_announce_proxy_configuration::Threshold;
use tracing::{debug, error, info, warn};

use super::channel::{self, Command, Event};
use super::{Error, WORKER_LOG_TARGET};
use crate::core::port_state::{Port, PortState};
use crate::servers::logging::STARTED_ON;
use crate::servers::proxy::announce::AnnouncePortRewriter;
use crate::servers::proxy::interceptor::InterceptorChain;
use crate::servers::proxy::server::{Launcher, ProxyServer};
use crate::servers::signals::global_shutdown_signal;

/// Runs the announce proxy for the announce proxy service.
///
/// It is started by the service. It reads commands from `stdin` and writes
/// events to `stdout`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address the proxy listens on.
    #[arg(long)]
    pub listen: SocketAddr,

    /// Initial public port.
    #[arg(long)]
    pub port: Port,

    /// Logging threshold.
    #[arg(long, default_value_t = Threshold::Info)]
    pub threshold: Threshold,
}

/// Runs the worker until the supervisor sends `shutdown`, closes the
/// command channel, or the process receives a termination signal.
///
/// # Errors
///
/// Will return `Err` if the proxy can not be started or the started event
/// can not be written.
pub async fn run<R, W>(args: Args, commands: R, mut events: W) -> Result<(), Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let port_state = Arc::new(PortState::new(args.port));

    let interceptors = InterceptorChain::default().with(Arc::new(AnnouncePortRewriter::new(port_state.clone())));

    let running = ProxyServer::new(Launcher::new(args.listen, interceptors)).start().await?;

    let address = running.state.binding;

    info!(target: WORKER_LOG_TARGET, "{STARTED_ON}: http://{address} (public port: {})", args.port);

    channel::send(&mut events, &Event::Started { address }).await?;

    tokio::select! {
        () = apply_commands(commands, &port_state) => {},
        () = global_shutdown_signal() => info!(target: WORKER_LOG_TARGET, "Termination signal received"),
    }

    running.stop().await?;

    info!(target: WORKER_LOG_TARGET, "Stopped");

    Ok(())
}

/// Applies the commands until `shutdown` or the end of the channel.
async fn apply_commands<R>(commands: R, port_state: &PortState)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(commands).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match channel::decode::<Command>(&line) {
                Ok(Command::SetPort { port }) => match port_state.set(i64::from(port)) {
                    Ok(()) => debug!(target: WORKER_LOG_TARGET, port, "public port replicated"),
                    Err(err) => warn!(target: WORKER_LOG_TARGET, %err, "public port rejected"),
                },
                Ok(Command::Shutdown) => {
                    info!(target: WORKER_LOG_TARGET, "Shutdown requested by the supervisor");
                    return;
                }
                Err(err) => warn!(target: WORKER_LOG_TARGET, %err, "ignoring command"),
            },
            Ok(None) => {
                info!(target: WORKER_LOG_TARGET, "Command channel closed by the supervisor");
                return;
            }
            Err(err) => {
                error!(target: WORKER_LOG_TARGET, %err, "unable to read the command channel");
                return;
            }
        }
    }
}
