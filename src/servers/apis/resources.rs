//! API resources.
use serde::{Deserialize, Serialize};

/// Result of an action that returns no data.
///
/// ```json
/// {"status":"success","message":"Port switched to 51413"}
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    Success { message: String },
    Error { message: String },
}

/// Current state of the service.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub current_port: u16,
    pub proxy_port: u16,
    pub api_port: u16,
}
