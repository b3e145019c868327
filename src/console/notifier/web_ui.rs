//! Delivers the new public port to the torrent client through its WebUI.
//!
//! It uses the qBittorrent WebUI API v2:
//!
//! 1. `POST /api/v2/auth/login` with the form fields `username` and
//!    `password`, unless `bypassAuth` is set. The session cookie is kept for
//!    the following calls.
//! 2. `GET /api/v2/app/preferences`.
//! 3. `POST /api/v2/app/setPreferences` with the form field `json`: the
//!    preferences with `announce_ip` and `announce_port` replaced.
//! 4. `POST /api/v2/torrents/reannounce` with `hashes=all`, when
//!    `reannounce` is set.
//!
//! The proxy is not involved: the torrent client announces the new port by
//! itself.
use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde_json::{Map, Value};
use torrust_announce_proxy_configuration::WebUi;
use tracing::{debug, info};

use super::{Error, Outcome, NOTIFIER_LOG_TARGET};
use crate::core::port_state::Port;

const LOGIN_PATH: &str = "api/v2/auth/login";
const PREFERENCES_PATH: &str = "api/v2/app/preferences";
const SET_PREFERENCES_PATH: &str = "api/v2/app/setPreferences";
const REANNOUNCE_PATH: &str = "api/v2/torrents/reannounce";

/// Body of the login response when the credentials are wrong.
const LOGIN_REJECTED: &str = "Fails.";

/// It sets the announce address of the torrent client to `public_ip` and
/// `port`.
///
/// # Errors
///
/// Will return `Err` if any of the WebUI calls fails.
pub async fn deliver(web_ui: &WebUi, public_ip: &str, port: Port, timeout: Duration) -> Result<Outcome, Error> {
    let mut client = WebUiClient::new(web_ui.endpoint.clone(), timeout)?;

    if web_ui.bypass_auth {
        debug!(target: NOTIFIER_LOG_TARGET, "Skipping the WebUI login");
    } else {
        client.login(&web_ui.username, &web_ui.password).await?;
    }

    let mut preferences = client.preferences().await?;

    preferences.insert("announce_ip".to_owned(), Value::String(public_ip.to_owned()));
    preferences.insert("announce_port".to_owned(), Value::from(port.get()));

    client.set_preferences(&preferences).await?;

    info!(target: NOTIFIER_LOG_TARGET, "Torrent client announce address set to {public_ip}:{port}");

    if web_ui.reannounce {
        client.reannounce_all().await?;
    }

    Ok(Outcome::WebUiUpdated { port: port.get() })
}

/// A minimal qBittorrent WebUI client.
#[derive(Debug)]
pub struct WebUiClient {
    client: reqwest::Client,
    endpoint: Url,
    cookie: Option<String>,
}

impl WebUiClient {
    /// # Errors
    ///
    /// Will return `Err` if the http client can not be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self {
            client,
            endpoint,
            cookie: None,
        })
    }

    /// # Errors
    ///
    /// Will return `Err` if the WebUI rejects the credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), Error> {
        let url = api_url(&self.endpoint, LOGIN_PATH)?;

        let response = self
            .send(&url, self.client.post(url.clone()).form(&[("username", username), ("password", password)]))
            .await?;

        let cookie = session_cookie(&response);

        let body = expect_ok(&url, response).await?;

        if body.trim() == LOGIN_REJECTED {
            return Err(Error::WebUiLoginRejected {
                username: username.to_owned(),
            });
        }

        self.cookie = cookie;

        Ok(())
    }

    /// # Errors
    ///
    /// Will return `Err` if the preferences can not be fetched or they are
    /// not a JSON object.
    pub async fn preferences(&self) -> Result<Map<String, Value>, Error> {
        let url = api_url(&self.endpoint, PREFERENCES_PATH)?;

        let response = self.send(&url, self.client.get(url.clone())).await?;

        let body = expect_ok(&url, response).await?;

        serde_json::from_str(&body).map_err(|source| Error::InvalidPreferences { source })
    }

    /// # Errors
    ///
    /// Will return `Err` if the WebUI does not accept the preferences.
    pub async fn set_preferences(&self, preferences: &Map<String, Value>) -> Result<(), Error> {
        let url = api_url(&self.endpoint, SET_PREFERENCES_PATH)?;

        let json = serde_json::to_string(preferences).map_err(|source| Error::InvalidPreferences { source })?;

        let response = self
            .send(&url, self.client.post(url.clone()).form(&[("json", json)]))
            .await?;

        expect_ok(&url, response).await.map(|_| ())
    }

    /// # Errors
    ///
    /// Will return `Err` if the WebUI rejects the call.
    pub async fn reannounce_all(&self) -> Result<(), Error> {
        let url = api_url(&self.endpoint, REANNOUNCE_PATH)?;

        let response = self
            .send(&url, self.client.post(url.clone()).form(&[("hashes", "all")]))
            .await?;

        expect_ok(&url, response).await.map(|_| ())
    }

    async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response, Error> {
        let request = match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        };

        request.send().await.map_err(|source| Error::Request {
            url: url.to_string(),
            source,
        })
    }
}

/// Joins `path` to the endpoint keeping its path prefix.
fn api_url(endpoint: &Url, path: &str) -> Result<Url, Error> {
    let url = format!("{}/{path}", endpoint.as_str().trim_end_matches('/'));

    Url::parse(&url).map_err(|source| Error::InvalidWebUiUrl { url, source })
}

/// The `name=value` pairs of the `Set-Cookie` headers, ready for a `Cookie`
/// header.
fn session_cookie(response: &Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

async fn expect_ok(url: &Url, response: Response) -> Result<String, Error> {
    let status = response.status();

    let body = response.text().await.map_err(|source| Error::Request {
        url: url.to_string(),
        source,
    })?;

    if status != StatusCode::OK {
        return Err(Error::UnexpectedResponse {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
