//! Initialize configuration from file or env var.
//!
//! There are three ways to inject the configuration, in priority order:
//!
//! 1. Environment variable `TORRUST_ANNOUNCE_PROXY_CONFIG_TOML`: the whole
//!    content of the `config.toml` file.
//! 2. Environment variable `TORRUST_ANNOUNCE_PROXY_CONFIG_TOML_PATH`: the
//!    path of the config file.
//! 3. The `config.toml` file next to the executable.
//!
//! A missing file is not an error. Refer to the [configuration documentation](https://docs.rs/torrust-announce-proxy-configuration)
//! for the configuration options.
use torrust_announce_proxy_configuration::{Configuration, Error, Info};

/// Loads the configuration from the environment.
///
/// The configuration can not be broken: when it can not be loaded the
/// defaults are used and the error is returned along with them, so it can
/// be logged once logging is ready.
#[must_use]
pub fn initialize_configuration() -> (Configuration, Option<Error>) {
    let info = Info::new(Info::default_config_toml_path());

    load_or_default(&info)
}

#[must_use]
pub fn load_or_default(info: &Info) -> (Configuration, Option<Error>) {
    match Configuration::load(info) {
        Ok(configuration) => (configuration, None),
        Err(err) => (Configuration::default(), Some(err)),
    }
}
