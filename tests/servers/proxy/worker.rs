//! The announce proxy running in the worker process, driven by the service
//! jobs.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use torrust_announce_proxy::app;
use torrust_announce_proxy::bootstrap::app::initialize_port_state;
use torrust_announce_proxy_test_helpers::configuration::ephemeral_with_random_api_port;
use tracing::level_filters::LevelFilter;

use crate::common::fake_tracker::FakeTracker;
use crate::common::logging::{tracing_stderr_init, INIT};
use crate::common::wait;
use crate::servers::api::client::Client;
use crate::servers::proxy::environment::proxied_client;

fn worker_program() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_announce_proxy_worker"))
}

#[tokio::test]
async fn the_worker_should_rewrite_announces_with_the_port_set_through_the_control_api() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let config = ephemeral_with_random_api_port();
    let port_state = Arc::new(initialize_port_state(Some("25565"), &config));

    let jobs = app::start_with_worker(&config, port_state, worker_program()).await.unwrap();

    let proxy = jobs.proxy_worker.as_ref().expect("the worker should be running").binding;
    let api = Client::new(jobs.control_api.state.binding);

    let tracker = FakeTracker::start().await;
    let announce_url = tracker.announce_url("info_hash=%3B%24U&peer_id=-qB00000000000000001&port=6881");

    proxied_client(proxy).get(&announce_url).send().await.unwrap();

    assert_eq!(
        tracker.received_queries(),
        vec!["info_hash=%3B%24U&peer_id=-qB00000000000000001&port=25565".to_string()]
    );

    api.port_changed("51413").await;

    let relayed = wait::until(Duration::from_secs(5), || {
        let announce_url = announce_url.clone();
        let tracker = &tracker;
        async move {
            proxied_client(proxy).get(&announce_url).send().await.ok()?;

            tracker
                .received_queries()
                .last()
                .filter(|query| query.ends_with("port=51413"))
                .cloned()
        }
    })
    .await;

    assert!(relayed.is_some(), "the worker should use the new port");

    jobs.stop().await;
}

#[tokio::test]
async fn the_status_should_report_the_port_the_worker_is_bound_to() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let config = ephemeral_with_random_api_port();
    let port_state = Arc::new(initialize_port_state(Some("25565"), &config));

    let jobs = app::start_with_worker(&config, port_state, worker_program()).await.unwrap();

    let proxy = jobs.proxy_worker.as_ref().expect("the worker should be running").binding;

    let status: serde_json::Value = Client::new(jobs.control_api.state.binding)
        .status()
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(status["proxyPort"], proxy.port());
    assert_eq!(status["currentPort"], 25565);

    jobs.stop().await;
}

#[tokio::test]
async fn the_control_api_should_keep_serving_without_a_worker() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let config = ephemeral_with_random_api_port();
    let port_state = Arc::new(initialize_port_state(Some("25565"), &config));

    let jobs = app::start_with_worker(&config, port_state, PathBuf::from("/nonexistent/announce_proxy_worker"))
        .await
        .unwrap();

    assert!(jobs.proxy_worker.is_none());

    let response = Client::new(jobs.control_api.state.binding).port_changed("51413").await;

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    jobs.stop().await;
}
