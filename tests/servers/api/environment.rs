use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use torrust_announce_proxy::core::port_state::{Port, PortState};
use torrust_announce_proxy::servers::apis::server::{ApiServer, Launcher, Running, Stopped};

use super::client::Client;

/// Port the proxy reports in the status of the test environments.
pub const PROXY_PORT: u16 = 8080;

pub struct Environment<S> {
    pub port_state: Arc<PortState>,
    pub server: ApiServer<S>,
}

impl Environment<Stopped> {
    pub fn new(initial_port: u16) -> Self {
        let port_state = Arc::new(PortState::new(Port::new(initial_port).unwrap()));

        let launcher = Launcher::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(1));

        Self {
            port_state,
            server: ApiServer::new(launcher),
        }
    }

    pub async fn start(self) -> Environment<Running> {
        Environment {
            port_state: self.port_state.clone(),
            server: self.server.start(self.port_state, PROXY_PORT).await.unwrap(),
        }
    }
}

impl Environment<Running> {
    pub async fn new(initial_port: u16) -> Self {
        Environment::<Stopped>::new(initial_port).start().await
    }

    pub async fn stop(self) -> Environment<Stopped> {
        Environment {
            port_state: self.port_state,
            server: self.server.stop().await.unwrap(),
        }
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.server.state.binding
    }

    pub fn client(&self) -> Client {
        Client::new(self.bind_address())
    }
}
