use serde::{Deserialize, Serialize};
use url::Url;

/// Torrent client WebUI (qBittorrent API v2) used as an alternate way to
/// deliver the new public port. When enabled, the notifier sets the
/// `announce_ip` and `announce_port` preferences of the client directly and
/// never touches the proxy service.
#[allow(clippy::struct_excessive_bools)]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WebUi {
    #[serde(default = "WebUi::default_enabled")]
    pub enabled: bool,

    /// Base URL of the WebUI, for example `http://127.0.0.1:8080`. A path
    /// prefix is kept when the WebUI is behind a reverse proxy.
    #[serde(default = "WebUi::default_endpoint")]
    pub endpoint: Url,

    #[serde(default = "WebUi::default_username")]
    pub username: String,

    #[serde(default = "WebUi::default_password")]
    pub password: String,

    /// Skip the login when the WebUI whitelists localhost.
    #[serde(default = "WebUi::default_bypass_auth")]
    pub bypass_auth: bool,

    /// Reannounce all torrents once the preferences are saved.
    #[serde(default = "WebUi::default_reannounce")]
    pub reannounce: bool,
}

impl Default for WebUi {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            endpoint: Self::default_endpoint(),
            username: Self::default_username(),
            password: Self::default_password(),
            bypass_auth: Self::default_bypass_auth(),
            reannounce: Self::default_reannounce(),
        }
    }
}

impl WebUi {
    fn default_enabled() -> bool {
        false
    }

    fn default_endpoint() -> Url {
        Url::parse("http://127.0.0.1:8080").expect("it should be a valid default url")
    }

    fn default_username() -> String {
        "admin".to_owned()
    }

    fn default_password() -> String {
        "admin".to_owned()
    }

    fn default_bypass_auth() -> bool {
        false
    }

    fn default_reannounce() -> bool {
        true
    }

    pub fn mask_secrets(&mut self) {
        "***".clone_into(&mut self.password);
    }
}
