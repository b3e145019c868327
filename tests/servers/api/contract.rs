use reqwest::StatusCode;
use serde_json::{json, Value};
use torrust_announce_proxy::servers::apis::resources::Status;
use tracing::level_filters::LevelFilter;

use crate::common::logging::{tracing_stderr_init, INIT};
use crate::servers::api::environment::PROXY_PORT;
use crate::servers::api::Started;

fn init_logging() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });
}

async fn current_port(env: &Started) -> u16 {
    env.client().status().await.json::<Status>().await.unwrap().current_port
}

mod for_the_port_change_endpoint {
    use super::*;

    #[tokio::test]
    async fn should_switch_the_public_port() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().port_changed("51413").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({"status": "success", "message": "Port switched to 51413"})
        );
        assert_eq!(env.port_state.get(), 51413);
        assert_eq!(current_port(&env).await, 51413);

        env.stop().await;
    }

    #[tokio::test]
    async fn should_accept_the_lowest_and_the_highest_ports() {
        init_logging();

        let env = Started::new(25565).await;

        for port in [1, 65535] {
            let response = env.client().port_changed(&port.to_string()).await;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(current_port(&env).await, port);
        }

        env.stop().await;
    }

    #[tokio::test]
    async fn should_keep_the_last_committed_port() {
        init_logging();

        let env = Started::new(25565).await;

        for port in ["6881", "6882", "6883"] {
            env.client().port_changed(port).await;
        }

        assert_eq!(current_port(&env).await, 6883);

        env.stop().await;
    }

    #[tokio::test]
    async fn should_reject_a_port_out_of_range_and_keep_the_current_one() {
        init_logging();

        let env = Started::new(25565).await;

        for invalid_port in ["0", "65536", "-1", "99999999999999999999"] {
            let response = env.client().port_changed(invalid_port).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{invalid_port}");
            assert_eq!(
                response.json::<Value>().await.unwrap(),
                json!({
                    "status": "error",
                    "message": format!("Invalid port: {invalid_port}, the port must be between 1-65535")
                })
            );
            assert_eq!(current_port(&env).await, 25565);
        }

        env.stop().await;
    }

    #[tokio::test]
    async fn should_reject_a_port_that_is_not_a_number() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().port_changed("abc").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(current_port(&env).await, 25565);

        env.stop().await;
    }

    #[tokio::test]
    async fn should_reject_a_request_without_the_port() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().port_changed_without_port().await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(current_port(&env).await, 25565);

        env.stop().await;
    }

    #[tokio::test]
    async fn should_reject_a_repeated_port_with_the_json_error() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().get("portChanged?new_port=1&new_port=2").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({
                "status": "error",
                "message": "Invalid port: 1,2, the port must be between 1-65535"
            })
        );
        assert_eq!(current_port(&env).await, 25565);

        env.stop().await;
    }
}

mod for_the_status_endpoint {
    use super::*;

    #[tokio::test]
    async fn should_report_the_current_port_and_the_bound_ports() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().status().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({
                "currentPort": 25565,
                "proxyPort": PROXY_PORT,
                "apiPort": env.bind_address().port()
            })
        );

        env.stop().await;
    }

    #[tokio::test]
    async fn should_include_a_request_id_header() {
        init_logging();

        let env = Started::new(25565).await;

        let response = env.client().status().await;

        assert!(response.headers().contains_key("x-request-id"));

        env.stop().await;
    }
}

#[tokio::test]
async fn should_answer_not_found_for_unknown_paths() {
    init_logging();

    let env = Started::new(25565).await;

    let response = env.client().get("unknown").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    env.stop().await;
}
