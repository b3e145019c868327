//! API responses.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::resources::{ActionStatus, Status};
use crate::core::port_state::Port;

#[must_use]
pub fn port_switched_response(port: Port) -> Response {
    (
        StatusCode::OK,
        Json(ActionStatus::Success {
            message: format!("Port switched to {port}"),
        }),
    )
        .into_response()
}

/// The message is the same for every rejected value, including a value that
/// is not a number at all.
#[must_use]
pub fn invalid_port_response(raw_port: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ActionStatus::Error {
            message: format!("Invalid port: {raw_port}, the port must be between 1-65535"),
        }),
    )
        .into_response()
}

#[must_use]
pub fn status_response(status: Status) -> Json<Status> {
    Json(status)
}
