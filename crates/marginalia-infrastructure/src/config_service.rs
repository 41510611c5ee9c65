//! Configuration service implementation.
//!
//! Loads `AppConfig` from `~/.config/marginalia/config.toml`, creating the
//! file with defaults when missing.

use crate::paths::{MarginaliaPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use marginalia_core::Result;
use marginalia_core::config::AppConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the application config.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration; `None` until first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(
            MarginaliaPaths::default().get_path(ServiceType::Config)?,
        ))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// An unreadable file falls back to defaults and is logged.
    pub fn get_config(&self) -> AppConfig {
        if let Ok(read_lock) = self.config.read()
            && let Some(cached) = read_lock.as_ref()
        {
            return cached.clone();
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Failed to load {:?}: {}", self.path, e);
            AppConfig::default()
        });

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let file = AtomicTomlFile::<AppConfig>::new(self.path.clone());
        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = AppConfig::default();
                file.save(&default_config)?;
                tracing::info!("[ConfigService] Created default config at {:?}", self.path);
                Ok(default_config)
            }
        }
    }
}
