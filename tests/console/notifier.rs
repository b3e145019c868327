use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use torrust_announce_proxy::console::notifier::app::notify;
use torrust_announce_proxy::console::notifier::client::HttpControlClient;
use torrust_announce_proxy::console::notifier::spawner::{DetachedSpawner, InstanceSpawner};
use torrust_announce_proxy::console::notifier::{Error, Outcome};
use torrust_announce_proxy::core::port_state::Port;
use torrust_announce_proxy::servers::apis::resources::Status;
use torrust_announce_proxy_configuration::ENV_VAR_CONFIG_TOML;
use torrust_announce_proxy_test_helpers::configuration::ephemeral;
use tracing::level_filters::LevelFilter;

use crate::common::logging::{tracing_stderr_init, INIT};
use crate::common::wait;
use crate::servers::api::client::Client;
use crate::servers::api::Started;

const TIMEOUT: Duration = Duration::from_secs(2);

fn init_logging() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });
}

fn public_port() -> Port {
    Port::new(51413).unwrap()
}

/// Counts the launches instead of launching anything.
#[derive(Default)]
struct CountingSpawner {
    spawned: AtomicUsize,
}

impl InstanceSpawner for CountingSpawner {
    fn spawn(&self, _port: Port) -> Result<u32, Error> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}

#[tokio::test]
async fn it_should_update_the_running_instance_without_launching_a_new_one() {
    init_logging();

    let env = Started::new(25565).await;

    let client = HttpControlClient::new(env.bind_address(), TIMEOUT).unwrap();
    let spawner = CountingSpawner::default();

    let outcome = notify(public_port(), env.bind_address(), TIMEOUT, &client, &spawner)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Updated { port: 51413 });
    assert_eq!(spawner.spawned.load(Ordering::SeqCst), 0);
    assert_eq!(env.port_state.get(), 51413);

    env.stop().await;
}

#[tokio::test]
async fn it_should_launch_a_new_instance_seeded_with_the_public_port_when_none_is_running() {
    init_logging();

    let config = ephemeral();
    let api_address = config.settings.control_api_bind_address();

    let spawner = DetachedSpawner::new(PathBuf::from(env!("CARGO_BIN_EXE_torrust-announce-proxy")))
        .env(ENV_VAR_CONFIG_TOML, config.to_toml().unwrap());

    let client = HttpControlClient::new(api_address, TIMEOUT).unwrap();

    let outcome = notify(public_port(), api_address, TIMEOUT, &client, &spawner).await.unwrap();

    let Outcome::Spawned { pid } = outcome else {
        panic!("a new instance should have been launched, got: {outcome}");
    };

    let status = wait::until(Duration::from_secs(10), || status(api_address)).await;

    terminate(pid);

    assert_eq!(status.map(|status| status.current_port), Some(51413));
}

#[tokio::test]
async fn the_notifier_program_should_deliver_the_public_port_to_the_running_instance() {
    init_logging();

    let env = Started::new(25565).await;

    let mut config = ephemeral();
    config.settings.control_api_port = env.bind_address().port();

    let exit_status = tokio::process::Command::new(env!("CARGO_BIN_EXE_port_changed_notifier"))
        .args(["tcp", "192.168.1.10", "6881", "203.0.113.7", "51413"])
        .env(ENV_VAR_CONFIG_TOML, config.to_toml().unwrap())
        .status()
        .await
        .unwrap();

    assert!(exit_status.success());
    assert_eq!(env.port_state.get(), 51413);

    env.stop().await;
}

#[tokio::test]
async fn the_notifier_program_should_fail_with_an_invalid_public_port() {
    init_logging();

    let env = Started::new(25565).await;

    let mut config = ephemeral();
    config.settings.control_api_port = env.bind_address().port();

    for invalid_port in ["65536", "-1", "abc"] {
        let exit_status = tokio::process::Command::new(env!("CARGO_BIN_EXE_port_changed_notifier"))
            .args(["tcp", "192.168.1.10", "6881", "203.0.113.7", invalid_port])
            .env(ENV_VAR_CONFIG_TOML, config.to_toml().unwrap())
            .status()
            .await
            .unwrap();

        assert_eq!(exit_status.code(), Some(1), "{invalid_port}");
        assert_eq!(env.port_state.get(), 25565);
    }

    env.stop().await;
}

async fn status(api_address: SocketAddr) -> Option<Status> {
    let response = Client::new(api_address).try_get("status").await?;

    response.json::<Status>().await.ok()
}

#[cfg(unix)]
fn terminate(pid: u32) {
    let _ = Command::new("kill").arg(pid.to_string()).status();
}

#[cfg(not(unix))]
fn terminate(pid: u32) {
    let _ = Command::new("taskkill").args(["/PID", &pid.to_string(), "/T", "/F"]).status();
}
