//! API handlers.
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::response::{Json, Response};
use derive_more::Constructor;
use tracing::{info, warn};

use super::resources::Status;
use super::responses::{invalid_port_response, port_switched_response, status_response};
use super::API_LOG_TARGET;
use crate::core::port_state::{Port, PortState};

const NEW_PORT_PARAM: &str = "new_port";

/// Shared state of the API handlers.
#[derive(Constructor, Debug)]
pub struct ControlState {
    pub port_state: Arc<PortState>,
    /// The port the announce proxy listens on.
    pub proxy_port: u16,
    /// The port this API is bound to.
    pub api_port: u16,
}

/// It handles the request to change the public port.
///
/// `GET /portChanged?new_port=<port>`
///
/// The query is read raw so a repeated or missing `new_port` gets the same
/// JSON error as any other invalid value.
pub async fn port_changed_handler(State(state): State<Arc<ControlState>>, RawQuery(query): RawQuery) -> Response {
    let raw_port = new_port_values(query.as_deref()).join(",");

    match raw_port.parse::<Port>() {
        Ok(port) => {
            let previous = state.port_state.get();

            state.port_state.commit(port);

            info!(target: API_LOG_TARGET, previous, current = %port, "Public port switched");

            port_switched_response(port)
        }
        Err(err) => {
            warn!(target: API_LOG_TARGET, %err, "Port change rejected");

            invalid_port_response(&raw_port)
        }
    }
}

/// It handles the request for the service status.
///
/// `GET /status`
pub async fn status_handler(State(state): State<Arc<ControlState>>) -> Json<Status> {
    status_response(Status {
        current_port: state.port_state.get(),
        proxy_port: state.proxy_port,
        api_port: state.api_port,
    })
}

/// The decoded values of the `new_port` params, in order.
fn new_port_values(query: Option<&str>) -> Vec<String> {
    query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .filter(|(name, _)| name == NEW_PORT_PARAM)
                .map(|(_, value)| value.into_owned())
                .collect()
        })
        .unwrap_or_default()
}
