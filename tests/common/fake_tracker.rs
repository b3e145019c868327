//! A tracker that records the raw query of the announce requests it gets.
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

/// Body of an announce response with no peers.
pub const ANNOUNCE_RESPONSE: &str = "d8:intervali1800e5:peers0:e";

pub struct FakeTracker {
    pub addr: SocketAddr,
    queries: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl FakeTracker {
    pub async fn start() -> Self {
        let queries = Arc::new(Mutex::new(vec![]));

        let app = Router::new()
            .route("/announce", get(announce))
            .with_state(queries.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, queries, task }
    }

    pub fn announce_url(&self, query: &str) -> String {
        format!("http://{}/announce?{query}", self.addr)
    }

    /// The raw queries received, in order.
    pub fn received_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Drop for FakeTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn announce(State(queries): State<Arc<Mutex<Vec<String>>>>, RawQuery(query): RawQuery) -> &'static str {
    queries.lock().unwrap().push(query.unwrap_or_default());

    ANNOUNCE_RESPONSE
}
