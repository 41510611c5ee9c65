//! Application configuration model.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "yellow";
pub const DEFAULT_PERSISTENCE_TIMEOUT_MS: u64 = 10_000;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Color recorded for highlighted sentences saved to the vault.
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    /// Upper bound for every annotation/vault call.
    #[serde(default = "default_persistence_timeout_ms")]
    pub persistence_timeout_ms: u64,
    /// Overrides the directory holding annotation and vault files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

fn default_highlight_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

fn default_persistence_timeout_ms() -> u64 {
    DEFAULT_PERSISTENCE_TIMEOUT_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            highlight_color: default_highlight_color(),
            persistence_timeout_ms: default_persistence_timeout_ms(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn persistence_timeout(&self) -> Duration {
        Duration::from_millis(self.persistence_timeout_ms)
    }
}
