//! A torrent client WebUI that implements the few qBittorrent API v2 calls
//! the notifier uses.
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "adminadmin";

const SESSION_COOKIE: &str = "SID=test-session";

#[derive(Default)]
pub struct Recorded {
    pub preferences: Option<Map<String, Value>>,
    pub reannounced: Vec<String>,
}

#[derive(Clone)]
struct AppState {
    require_auth: bool,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct FakeQbittorrent {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    task: JoinHandle<()>,
}

impl FakeQbittorrent {
    /// `require_auth`: calls without the session cookie get a 403.
    pub async fn start(require_auth: bool) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let state = AppState {
            require_auth,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/api/v2/auth/login", post(login))
            .route("/api/v2/app/preferences", get(preferences))
            .route("/api/v2/app/setPreferences", post(set_preferences))
            .route("/api/v2/torrents/reannounce", post(reannounce))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded, task }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn saved_preferences(&self) -> Option<Map<String, Value>> {
        self.recorded.lock().unwrap().preferences.clone()
    }

    pub fn reannounced(&self) -> Vec<String> {
        self.recorded.lock().unwrap().reannounced.clone()
    }
}

impl Drop for FakeQbittorrent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct SetPreferencesForm {
    json: String,
}

#[derive(Deserialize)]
struct ReannounceForm {
    hashes: String,
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    !state.require_auth
        || headers
            .get(COOKIE)
            .and_then(|cookie| cookie.to_str().ok())
            .is_some_and(|cookie| cookie.contains(SESSION_COOKIE))
}

async fn login(Form(form): Form<LoginForm>) -> Response {
    if form.username == USERNAME && form.password == PASSWORD {
        (StatusCode::OK, [(SET_COOKIE, format!("{SESSION_COOKIE}; HttpOnly; path=/"))], "Ok.").into_response()
    } else {
        (StatusCode::OK, "Fails.").into_response()
    }
}

async fn preferences(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::FORBIDDEN.into_response();
    }

    Json(json!({
        "announce_ip": "",
        "announce_port": 0,
        "listen_port": 6881,
        "save_path": "/downloads"
    }))
    .into_response()
}

async fn set_preferences(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<SetPreferencesForm>) -> StatusCode {
    if !authorized(&state, &headers) {
        return StatusCode::FORBIDDEN;
    }

    let Ok(preferences) = serde_json::from_str::<Map<String, Value>>(&form.json) else {
        return StatusCode::BAD_REQUEST;
    };

    state.recorded.lock().unwrap().preferences = Some(preferences);

    StatusCode::OK
}

async fn reannounce(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<ReannounceForm>) -> StatusCode {
    if !authorized(&state, &headers) {
        return StatusCode::FORBIDDEN;
    }

    state.recorded.lock().unwrap().reannounced.push(form.hashes);

    StatusCode::OK
}
