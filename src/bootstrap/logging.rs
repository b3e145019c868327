//! Setup for the application logging.
//!
//! It redirects the log info to the standard output, or to the standard
//! error for the processes that use the standard output for something else,
//! with the threshold defined in the configuration.
//!
//! - `Off`
//! - `Error`
//! - `Warn`
//! - `Info`
//! - `Debug`
//! - `Trace`
//!
//! Refer to the [configuration crate documentation](https://docs.rs/torrust-announce-proxy-configuration)
//! to know how to change log settings.
use std::sync::Once;

use torrust_announce_proxy_configuration::Threshold;
use tracing::info;
use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// Where the logs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Stdout,
    /// Used by the proxy worker, whose standard output is its event channel,
    /// and by the notifier.
    Stderr,
}

/// It initializes the global subscriber. Only the first call has effect.
pub fn setup(threshold: Threshold, output: Output) {
    let tracing_level = map_to_tracing_level_filter(threshold);

    if tracing_level == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        tracing_init(tracing_level, output);
    });
}

fn map_to_tracing_level_filter(threshold: Threshold) -> LevelFilter {
    match threshold {
        Threshold::Off => LevelFilter::OFF,
        Threshold::Error => LevelFilter::ERROR,
        Threshold::Warn => LevelFilter::WARN,
        Threshold::Info => LevelFilter::INFO,
        Threshold::Debug => LevelFilter::DEBUG,
        Threshold::Trace => LevelFilter::TRACE,
    }
}

fn tracing_init(filter: LevelFilter, output: Output) {
    let builder = tracing_subscriber::fmt().with_max_level(filter);

    let () = match output {
        Output::Stdout => builder.with_ansi(true).init(),
        Output::Stderr => builder.with_writer(std::io::stderr).with_ansi(false).init(),
    };

    info!("Logging initialized");
}
