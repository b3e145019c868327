use std::net::{Ipv4Addr, SocketAddr, TcpListener};

/// Returns a localhost port that was free when the function was called.
///
/// The port is bound and released straight away, so a different process
/// could grab it before the caller binds it again. It's good enough for
/// tests that need to know a port in advance (for example, to probe it
/// from another process).
///
/// # Panics
///
/// Will panic if it can't bind to an ephemeral localhost port.
#[must_use]
pub fn free_port() -> u16 {
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).expect("it should bind to an ephemeral port");

    listener.local_addr().expect("it should have a local address").port()
}
