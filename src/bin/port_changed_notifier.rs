//! Program to notify the announce proxy about a new public port.
//!
//! ```text
//! port_changed_notifier <protocol> <private_ip> <private_port> <public_ip> <public_port>
//! ```
use std::process::ExitCode;

use torrust_announce_proxy::console::notifier::app;

#[tokio::main]
async fn main() -> ExitCode {
    match app::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
