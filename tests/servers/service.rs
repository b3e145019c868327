//! The `torrust-announce-proxy` service binary.
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::time::Duration;

use torrust_announce_proxy::servers::apis::resources::Status;
use torrust_announce_proxy_configuration::ENV_VAR_CONFIG_TOML;
use torrust_announce_proxy_test_helpers::configuration::ephemeral;
use torrust_announce_proxy_test_helpers::network::free_port;

use crate::common::wait;
use crate::servers::api::client::Client;

fn is_free(port: u16) -> bool {
    TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).is_ok()
}

#[cfg(unix)]
#[tokio::test]
async fn it_should_release_the_api_and_the_proxy_ports_on_sigterm() {
    let mut config = ephemeral();
    config.settings.proxy_listen_port = free_port();

    let api_address = config.settings.control_api_bind_address();

    let mut service = tokio::process::Command::new(env!("CARGO_BIN_EXE_torrust-announce-proxy"))
        .arg("51413")
        .env(ENV_VAR_CONFIG_TOML, config.to_toml().unwrap())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let status = wait::until(Duration::from_secs(10), move || async move {
        Client::new(api_address).try_get("status").await?.json::<Status>().await.ok()
    })
    .await
    .expect("the service should be serving the control API");

    assert_eq!(status.current_port, 51413);
    assert_eq!(status.proxy_port, config.settings.proxy_listen_port);
    assert!(!is_free(status.proxy_port), "the worker should be listening");

    let pid = service.id().unwrap();

    std::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .unwrap();

    let exit_status = tokio::time::timeout(Duration::from_secs(10), service.wait())
        .await
        .expect("the service should exit after SIGTERM")
        .unwrap();

    assert!(exit_status.success());

    let released = wait::until(Duration::from_secs(5), move || async move {
        (is_free(status.api_port) && is_free(status.proxy_port)).then_some(())
    })
    .await;

    assert!(released.is_some(), "both ports should be released");
}
