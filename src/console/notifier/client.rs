//! Client for the control API of a running instance.
use std::net::SocketAddr;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt as _;
#[cfg(test)]
use mockall::automock;

use super::Error;
use crate::core::port_state::Port;

/// Sends the new public port to a running instance.
#[cfg_attr(test, automock)]
pub trait ControlClient: Sync + Send {
    fn port_changed(&self, port: Port) -> BoxFuture<'static, Result<(), Error>>;
}

/// A [`ControlClient`] that calls the HTTP control API.
#[derive(Debug, Clone)]
pub struct HttpControlClient {
    client: reqwest::Client,
    addr: SocketAddr,
}

impl HttpControlClient {
    /// # Errors
    ///
    /// Will return `Err` if the http client can not be built.
    pub fn new(addr: SocketAddr, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self { client, addr })
    }

    #[must_use]
    pub fn port_changed_url(&self, port: Port) -> String {
        format!("http://{}/portChanged?new_port={port}", self.addr)
    }
}

impl ControlClient for HttpControlClient {
    fn port_changed(&self, port: Port) -> BoxFuture<'static, Result<(), Error>> {
        let client = self.client.clone();
        let url = self.port_changed_url(port);

        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| Error::Request { url: url.clone(), source })?;

            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();

                return Err(Error::UnexpectedResponse {
                    url,
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(())
        }
        .boxed()
    }
}
