//! Program to run the announce proxy worker.
//!
//! It is started by the `torrust-announce-proxy` service, which sends it
//! commands through its standard input. It is not meant to be run by hand.
use clap::Parser;
use torrust_announce_proxy::bootstrap::logging::{self, Output};
use torrust_announce_proxy::servers::proxy::worker::process::{self, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::setup(args.threshold, Output::Stderr);

    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(process::run(args, tokio::io::stdin(), tokio::io::stdout()));

    // A pending read of the standard input would otherwise keep the runtime alive.
    runtime.shutdown_background();

    Ok(result?)
}
