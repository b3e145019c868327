//! Version `1` for [Torrust Announce Proxy](https://docs.rs/torrust-announce-proxy)
//! configuration data structures.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file
//! `config.toml` placed next to the executables or from an environment
//! variable with the same content as the file.
//!
//! When the file does not exist the default configuration is used. There is
//! nothing in the configuration that the proxy can not work without.
//!
//! # Sections
//!
//! Each section in the toml structure is mapped to a data structure:
//!
//! - [`[logging]`](crate::v1::logging::Logging)
//! - [`[settings]`](crate::v1::settings::Settings)
//! - [`[notifier]`](crate::v1::notifier::Notifier)
//! - [`[webui]`](crate::v1::web_ui::WebUi)
//!
//! # Port binding
//!
//! Both the control API and the proxy are bound to the `bindHost` address,
//! `127.0.0.1` by default. The control API has no authentication, so it
//! should never be exposed to other hosts.
//!
//! # Default configuration
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [settings]
//! controlApiPort = 8000
//! proxyListenPort = 8080
//! bindHost = "127.0.0.1"
//! defaultPublicPort = 25565
//! workerShutdownTimeoutSecs = 5
//!
//! [notifier]
//! connectTimeoutMs = 1000
//!
//! [webui]
//! enabled = false
//! endpoint = "http://127.0.0.1:8080/"
//! username = "admin"
//! password = "admin"
//! bypassAuth = false
//! reannounce = true
//! ```
//!
//! The keys `webApiBindPort` and `mitmProxyBindPort` from older
//! configuration files are still accepted as aliases of `controlApiPort` and
//! `proxyListenPort`.
pub mod logging;
pub mod notifier;
pub mod settings;
pub mod web_ui;

use std::fs;

use camino::Utf8Path;
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use self::logging::Logging;
use self::notifier::Notifier;
use self::settings::Settings;
use self::web_ui::WebUi;
use crate::{Error, Info};

/// Core configuration for the announce proxy.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Configuration {
    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,

    /// Ports and listeners of the service.
    #[serde(default)]
    pub settings: Settings,

    /// Options only used by the port change notifier.
    #[serde(default)]
    pub notifier: Notifier,

    /// Alternate delivery of the new port through the torrent client WebUI.
    #[serde(default, rename = "webui")]
    pub web_ui: WebUi,
}

impl Configuration {
    /// Loads the configuration from the `Info` struct.
    ///
    /// The inline TOML content has priority over the file. A missing file is
    /// not an error: every section falls back to its defaults.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the TOML is malformed or a value has the wrong
    /// type.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = match &info.config_toml {
            Some(config_toml) => Figment::new().merge(Toml::string(config_toml)),
            None => {
                if !info.config_toml_path.exists() {
                    return Ok(Configuration::default());
                }
                Figment::new().merge(Toml::file(&info.config_toml_path))
            }
        };

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Loads the configuration from a file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file has a bad configuration.
    pub fn load_from_file(path: &Utf8Path) -> Result<Configuration, Error> {
        let info = Info {
            config_toml: None,
            config_toml_path: path.to_owned(),
        };

        Self::load(&info)
    }

    /// Saves the configuration to the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration cannot be encoded to TOML or
    /// the file cannot be written.
    pub fn save_to_file(&self, path: &Utf8Path) -> Result<(), Error> {
        let toml = self.to_toml()?;

        fs::write(path, toml).map_err(|source| Error::UnableToWrite {
            path: path.to_owned(),
            source,
        })
    }

    /// Encodes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration cannot be encoded.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string(self).map_err(|source| Error::UnableToEncode { source })
    }

    /// Encodes the configuration to TOML with the secrets masked, ready to be
    /// logged.
    #[must_use]
    pub fn to_masked_toml(&self) -> String {
        let mut masked = self.clone();

        masked.web_ui.mask_secrets();

        masked.to_toml().unwrap_or_default()
    }
}
