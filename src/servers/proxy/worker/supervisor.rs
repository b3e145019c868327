//! The supervisor side.
//!
//! [`WorkerLauncher::start`] spawns the worker binary and waits until the
//! worker reports its bound address. From then on a task owns the child
//! process and:
//!
//! - Sends every port committed to the [`PortState`] to the worker.
//! - Logs when the worker exits on its own. The rest of the service keeps
//!   running.
//! - On [`RunningWorker::stop`] asks the worker to stop, waits for it with a
//!   timeout and kills it if it is still alive after that.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use torrust_announce_proxy_configuration::Threshold;
use tracing::{debug, error, info, warn};

use super::channel::{self, Event};
use super::{Error, WORKER_LOG_TARGET};
use crate::core::port_state::PortState;
use crate::servers::signals::Halted;

/// The name of the worker binary.
pub const WORKER_BINARY_NAME: &str = "announce_proxy_worker";

/// How long the worker has to report it was started.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Starts the proxy worker.
#[derive(Debug, Clone)]
pub struct WorkerLauncher {
    /// The worker executable.
    pub program: PathBuf,
    /// The address the worker proxy listens on.
    pub listen: SocketAddr,
    /// The logging threshold passed to the worker.
    pub threshold: Threshold,
    pub start_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl WorkerLauncher {
    #[must_use]
    pub fn new(program: PathBuf, listen: SocketAddr, threshold: Threshold, shutdown_timeout: Duration) -> Self {
        Self {
            program,
            listen,
            threshold,
            start_timeout: DEFAULT_START_TIMEOUT,
            shutdown_timeout,
        }
    }

    /// The worker binary installed next to the running executable.
    #[must_use]
    pub fn default_program() -> PathBuf {
        let file_name = format!("{WORKER_BINARY_NAME}{}", std::env::consts::EXE_SUFFIX);

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
            .unwrap_or_else(|| PathBuf::from(file_name))
    }

    /// Spawns the worker seeded with the current port and starts relaying
    /// the port changes.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the worker can not be spawned, or it does not
    /// report it was started in time.
    pub async fn start(self, port_state: &PortState) -> Result<RunningWorker, Error> {
        let mut commits = port_state.subscribe();
        let seed = *commits.borrow_and_update();

        let mut command = Command::new(&self.program);

        command
            .arg("--listen")
            .arg(self.listen.to_string())
            .arg("--port")
            .arg(seed.to_string())
            .arg("--threshold")
            .arg(self.threshold.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // The terminal interrupt is handled by the service, which stops the worker.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| Error::UnableToSpawn {
            program: self.program.clone(),
            source,
        })?;

        let pid = child.id();

        let stdin = child.stdin.take().ok_or(Error::MissingPipe { stream: "stdin" })?;
        let stdout = child.stdout.take().ok_or(Error::MissingPipe { stream: "stdout" })?;

        let mut events = BufReader::new(stdout).lines();

        let binding = tokio::time::timeout(self.start_timeout, wait_until_started(&mut events))
            .await
            .map_err(|_| Error::StartTimeout {
                timeout: self.start_timeout,
            })??;

        info!(target: WORKER_LOG_TARGET, ?pid, %binding, "Proxy worker started");

        let (tx_halt, rx_halt) = oneshot::channel::<Halted>();

        let task = tokio::spawn(supervise(child, stdin, commits, rx_halt, self.shutdown_timeout));

        Ok(RunningWorker {
            binding,
            pid,
            halt_task: tx_halt,
            task,
        })
    }
}

/// A started worker.
#[derive(Debug)]
pub struct RunningWorker {
    /// The address the worker proxy is bound to.
    pub binding: SocketAddr,
    pub pid: Option<u32>,
    halt_task: oneshot::Sender<Halted>,
    task: JoinHandle<()>,
}

impl RunningWorker {
    /// `true` once the worker process is gone, stopped or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the worker. It also works when the worker has already exited.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the supervisor task panicked.
    pub async fn stop(self) -> Result<(), Error> {
        if self.halt_task.send(Halted::Normal).is_err() {
            debug!(target: WORKER_LOG_TARGET, pid = ?self.pid, "the proxy worker had already exited");
        }

        self.task.await.map_err(|source| Error::SupervisorFailed { source })
    }
}

async fn wait_until_started(events: &mut Lines<BufReader<ChildStdout>>) -> Result<SocketAddr, Error> {
    loop {
        match events.next_line().await.map_err(|source| Error::Channel { source })? {
            Some(line) if line.trim().is_empty() => {}
            Some(line) => {
                let Event::Started { address } = channel::decode::<Event>(&line)?;
                return Ok(address);
            }
            None => return Err(Error::ExitedBeforeStart),
        }
    }
}

async fn supervise(
    mut child: Child,
    mut stdin: ChildStdin,
    mut commits: watch::Receiver<u16>,
    mut rx_halt: oneshot::Receiver<Halted>,
    shutdown_timeout: Duration,
) {
    loop {
        tokio::select! {
            changed = commits.changed() => {
                if changed.is_err() {
                    break;
                }

                let port = *commits.borrow_and_update();

                match tokio::time::timeout(shutdown_timeout, channel::send(&mut stdin, &channel::Command::SetPort { port })).await {
                    Ok(Ok(())) => debug!(target: WORKER_LOG_TARGET, port, "public port sent to the proxy worker"),
                    Ok(Err(err)) => warn!(target: WORKER_LOG_TARGET, port, %err, "unable to send the public port to the proxy worker"),
                    Err(_) => warn!(target: WORKER_LOG_TARGET, port, "the proxy worker is not reading its commands"),
                }
            }
            status = child.wait() => {
                match status {
                    Ok(status) => error!(target: WORKER_LOG_TARGET, %status, "The proxy worker exited unexpectedly"),
                    Err(err) => error!(target: WORKER_LOG_TARGET, %err, "Unable to wait for the proxy worker"),
                }
                return;
            }
            _ = &mut rx_halt => break,
        }
    }

    match tokio::time::timeout(shutdown_timeout, channel::send(&mut stdin, &channel::Command::Shutdown)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => debug!(target: WORKER_LOG_TARGET, %err, "unable to send the shutdown command to the proxy worker"),
        Err(_) => debug!(target: WORKER_LOG_TARGET, "the proxy worker is not reading its commands"),
    }

    drop(stdin);

    match tokio::time::timeout(shutdown_timeout, child.wait()).await {
        Ok(Ok(status)) => info!(target: WORKER_LOG_TARGET, %status, "Proxy worker stopped"),
        Ok(Err(err)) => warn!(target: WORKER_LOG_TARGET, %err, "Unable to wait for the proxy worker"),
        Err(_) => {
            warn!(target: WORKER_LOG_TARGET, "The proxy worker did not stop within {shutdown_timeout:?}, killing it");

            if let Err(err) = child.kill().await {
                error!(target: WORKER_LOG_TARGET, %err, "Unable to kill the proxy worker");
            }
        }
    }
}
