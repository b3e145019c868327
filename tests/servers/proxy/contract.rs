use reqwest::StatusCode;
use tracing::level_filters::LevelFilter;

use crate::common::fake_tracker::{FakeTracker, ANNOUNCE_RESPONSE};
use crate::common::logging::{tracing_stderr_init, INIT};
use crate::servers::proxy::environment::Environment;

const INFO_HASH: &str = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";
const PEER_ID: &str = "-qB00000000000000001";

fn init_logging() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });
}

mod for_announce_requests {
    use super::*;

    #[tokio::test]
    async fn should_replace_the_port_with_the_current_public_port() {
        init_logging();

        let tracker = FakeTracker::start().await;
        let env = Environment::start(51413).await;

        let response = env
            .client()
            .get(tracker.announce_url(&format!("info_hash={INFO_HASH}&peer_id={PEER_ID}&port=6881&uploaded=0")))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), ANNOUNCE_RESPONSE);
        assert_eq!(
            tracker.received_queries(),
            vec![format!("info_hash={INFO_HASH}&peer_id={PEER_ID}&port=51413&uploaded=0")]
        );

        env.stop().await;
    }

    #[tokio::test]
    async fn should_use_the_port_committed_after_the_proxy_started() {
        init_logging();

        let tracker = FakeTracker::start().await;
        let env = Environment::start(51413).await;

        env.port_state.set(40000).unwrap();

        env.client()
            .get(tracker.announce_url(&format!("info_hash={INFO_HASH}&peer_id={PEER_ID}&port=6881")))
            .send()
            .await
            .unwrap();

        assert_eq!(
            tracker.received_queries(),
            vec![format!("info_hash={INFO_HASH}&peer_id={PEER_ID}&port=40000")]
        );

        env.stop().await;
    }
}

mod for_other_requests {
    use super::*;

    #[tokio::test]
    async fn should_forward_a_request_without_all_the_announce_params_unchanged() {
        init_logging();

        let tracker = FakeTracker::start().await;
        let env = Environment::start(51413).await;

        let query = format!("info_hash={INFO_HASH}&port=6881");

        let response = env.client().get(tracker.announce_url(&query)).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tracker.received_queries(), vec![query]);

        env.stop().await;
    }

    #[tokio::test]
    async fn should_forward_the_upstream_status() {
        init_logging();

        let tracker = FakeTracker::start().await;
        let env = Environment::start(51413).await;

        let response = env
            .client()
            .get(format!("http://{}/scrape", tracker.addr))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        env.stop().await;
    }
}

#[tokio::test]
async fn should_answer_bad_gateway_when_the_tracker_is_unreachable() {
    init_logging();

    let env = Environment::start(51413).await;

    let unreachable = torrust_announce_proxy_test_helpers::network::free_port();

    let response = env
        .client()
        .get(format!(
            "http://127.0.0.1:{unreachable}/announce?info_hash={INFO_HASH}&peer_id={PEER_ID}&port=6881"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    env.stop().await;
}
