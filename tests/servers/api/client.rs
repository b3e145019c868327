use std::net::SocketAddr;

use reqwest::Response;

/// Control API client.
pub struct Client {
    bind_address: SocketAddr,
}

impl Client {
    pub fn new(bind_address: SocketAddr) -> Self {
        Self { bind_address }
    }

    pub async fn port_changed(&self, new_port: &str) -> Response {
        self.get(&format!("portChanged?new_port={new_port}")).await
    }

    pub async fn port_changed_without_port(&self) -> Response {
        self.get("portChanged").await
    }

    pub async fn status(&self) -> Response {
        self.get("status").await
    }

    pub async fn get(&self, path: &str) -> Response {
        self.try_get(path).await.unwrap()
    }

    /// Like [`Client::get`] but `None` when nothing answers.
    pub async fn try_get(&self, path: &str) -> Option<Response> {
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get(format!("http://{}/{path}", self.bind_address))
            .send()
            .await
            .ok()
    }
}
