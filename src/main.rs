use anyhow::Context as _;
use clap::Parser;
use torrust_announce_proxy::servers::signals::global_shutdown_signal;
use torrust_announce_proxy::{app, bootstrap};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = bootstrap::app::Args::parse();

    let (config, port_state) = bootstrap::app::setup(&args);

    let jobs = app::start(&config, port_state)
        .await
        .context("unable to start the control API, is another instance running?")?;

    // handle the signals
    tokio::select! {
        () = global_shutdown_signal() => info!("Torrust announce proxy shutting down .."),
        () = jobs.halted() => warn!("The control API halted, shutting down .."),
    }

    jobs.stop().await;

    info!("Torrust announce proxy successfully shutdown.");

    Ok(())
}
