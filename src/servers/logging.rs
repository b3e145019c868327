/// This is the prefix used in logs to identify a started service.
///
/// For example:
///
/// ```text
/// 2024-06-25T12:36:25.025312Z  INFO ANNOUNCE PROXY: Started on: http://127.0.0.1:8080
/// 2024-06-25T12:36:25.025445Z  INFO PROXY WORKER: Started on: http://127.0.0.1:8080
/// 2024-06-25T12:36:25.025527Z  INFO CONTROL API: Started on: http://127.0.0.1:8000
/// ```
pub const STARTED_ON: &str = "Started on";
