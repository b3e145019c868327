//! Configuration data structures for [Torrust Announce Proxy](https://docs.rs/torrust-announce-proxy).
//!
//! This module contains the configuration data structures for the
//! Torrust Announce Proxy, a forward proxy that rewrites the `port` param of
//! `BitTorrent` announce requests to the current public (NAT) port.
//!
//! The current version for configuration is [`v1`].
pub mod v1;

use std::env;

use camino::Utf8PathBuf;
use thiserror::Error;

// Environment variables

/// The whole `config.toml` file content. It has priority over the config file.
/// Even if the file is not on the default path.
pub const ENV_VAR_CONFIG_TOML: &str = "TORRUST_ANNOUNCE_PROXY_CONFIG_TOML";

/// The `config.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "TORRUST_ANNOUNCE_PROXY_CONFIG_TOML_PATH";

/// The default file name. It's looked up in the directory of the running
/// executable, so the service and the notifier agree on it no matter which
/// working directory they were launched from.
pub const DEFAULT_CONFIG_TOML_FILE_NAME: &str = "config.toml";

pub type Configuration = v1::Configuration;
pub type Settings = v1::settings::Settings;
pub type Logging = v1::logging::Logging;
pub type Threshold = v1::logging::Threshold;
pub type Notifier = v1::notifier::Notifier;
pub type WebUi = v1::web_ui::WebUi;

/// Information required for loading config
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: Utf8PathBuf,
}

impl Info {
    /// Build Configuration Info
    ///
    /// The env var with the whole TOML content has priority over the env var
    /// with the file path, and that one over the `default_config_toml_path`.
    #[must_use]
    pub fn new(default_config_toml_path: Utf8PathBuf) -> Self {
        let config_toml = if let Ok(config_toml) = env::var(ENV_VAR_CONFIG_TOML) {
            println!("Loading configuration from environment variable {ENV_VAR_CONFIG_TOML} ...");
            Some(config_toml)
        } else {
            None
        };

        let config_toml_path = if let Ok(config_toml_path) = env::var(ENV_VAR_CONFIG_TOML_PATH) {
            Utf8PathBuf::from(config_toml_path)
        } else {
            default_config_toml_path
        };

        Self {
            config_toml,
            config_toml_path,
        }
    }

    /// Info for an inline TOML document. It ignores the environment.
    #[must_use]
    pub fn from_toml(config_toml: &str) -> Self {
        Self {
            config_toml: Some(config_toml.to_owned()),
            config_toml_path: Utf8PathBuf::new(),
        }
    }

    /// The path of the `config.toml` file next to the running executable.
    ///
    /// Falls back to `./config.toml` when the executable path is unknown.
    #[must_use]
    pub fn default_config_toml_path() -> Utf8PathBuf {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(std::path::Path::to_path_buf))
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map_or_else(
                || Utf8PathBuf::from(".").join(DEFAULT_CONFIG_TOML_FILE_NAME),
                |dir| dir.join(DEFAULT_CONFIG_TOML_FILE_NAME),
            )
    }

    #[must_use]
    pub fn config_toml_path(&self) -> &Utf8PathBuf {
        &self.config_toml_path
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The TOML content could not be mapped onto the configuration
    /// structures. For example, a port out of the `u16` range.
    #[error("Failed processing the configuration: {source}")]
    ConfigError { source: Box<figment::Error> },

    #[error("Unable to encode the configuration as TOML: {source}")]
    UnableToEncode { source: toml::ser::Error },

    #[error("Unable to write the configuration file {path}: {source}")]
    UnableToWrite { path: Utf8PathBuf, source: std::io::Error },
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigError { source: Box::new(err) }
    }
}
