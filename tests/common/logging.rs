//! Logging for the integration tests.
//!
//! Tests should start their own logging:
//!
//! ```text
//! INIT.call_once(|| {
//!     tracing_stderr_init(LevelFilter::ERROR);
//! });
//! ```
use std::sync::Once;

use tracing::level_filters::LevelFilter;

#[allow(dead_code)]
pub static INIT: Once = Once::new();

#[allow(dead_code)]
pub fn tracing_stderr_init(filter: LevelFilter) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    builder.with_file(true).init();

    tracing::info!("Logging initialized");
}
