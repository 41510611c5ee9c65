//! Path management for marginalia files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/marginalia/          # Config directory
//! └── config.toml                # Application configuration
//!
//! ~/.local/share/marginalia/     # Data directory (overridable via `data_dir`)
//! ├── annotations.toml           # Memos and highlights
//! └── vault.toml                 # Vault items
//! ```

use marginalia_core::config::AppConfig;
use marginalia_core::{MarginaliaError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "marginalia";

/// Kinds of files managed by marginalia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Annotations,
    Vault,
}

impl ServiceType {
    fn file_name(&self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::Annotations => "annotations.toml",
            ServiceType::Vault => "vault.toml",
        }
    }
}

/// Resolves file locations, optionally rooted at a custom data directory.
#[derive(Debug, Clone, Default)]
pub struct MarginaliaPaths {
    data_dir_override: Option<PathBuf>,
}

impl MarginaliaPaths {
    pub fn new(data_dir_override: Option<PathBuf>) -> Self {
        Self { data_dir_override }
    }

    /// Honors `data_dir` from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir.as_ref().map(PathBuf::from))
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MarginaliaError::config("Cannot find config directory"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir_override {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MarginaliaError::config("Cannot find data directory"))
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf> {
        let base = match service {
            ServiceType::Config => Self::config_dir()?,
            ServiceType::Annotations | ServiceType::Vault => self.data_dir()?,
        };
        Ok(base.join(service.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_applies_to_data_files_only() {
        let paths = MarginaliaPaths::new(Some(PathBuf::from("/tmp/marginalia-test")));
        assert_eq!(
            paths.get_path(ServiceType::Vault).unwrap(),
            PathBuf::from("/tmp/marginalia-test/vault.toml")
        );
        assert_eq!(
            paths.get_path(ServiceType::Annotations).unwrap(),
            PathBuf::from("/tmp/marginalia-test/annotations.toml")
        );
    }

    #[test]
    fn test_from_config_uses_data_dir() {
        let config = AppConfig {
            data_dir: Some("/srv/marginalia".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            MarginaliaPaths::from_config(&config).data_dir().unwrap(),
            PathBuf::from("/srv/marginalia")
        );
    }
}
