use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Options used by the port change notifier.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notifier {
    /// Maximum time in milliseconds the notifier waits while probing the
    /// control API port. A probe that times out is treated as a failure,
    /// never as "not running".
    #[serde(default = "Notifier::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// The service executable launched when no instance is running. When
    /// not set, the `torrust-announce-proxy` binary next to the notifier is
    /// used.
    #[serde(default)]
    pub service_binary: Option<Utf8PathBuf>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            connect_timeout_ms: Self::default_connect_timeout_ms(),
            service_binary: None,
        }
    }
}

impl Notifier {
    fn default_connect_timeout_ms() -> u64 {
        1000
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
