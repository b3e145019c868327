//! Detects a running instance of the service.
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;

use super::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Running,
    NotRunning,
}

/// Connects to the control API port.
///
/// A refused connection means nothing is listening.
///
/// # Errors
///
/// Will return `Err` for any other connection failure, including a timeout.
/// Those can not be told apart from a running instance that is busy.
pub async fn probe(addr: SocketAddr, timeout: Duration) -> Result<InstanceState, Error> {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Ok(InstanceState::Running),
        Ok(Err(err)) if err.kind() == ErrorKind::ConnectionRefused => Ok(InstanceState::NotRunning),
        Ok(Err(source)) => Err(Error::Probe { addr, source }),
        Err(_) => Err(Error::ProbeTimeout { addr, timeout }),
    }
}
