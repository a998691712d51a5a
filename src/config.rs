//! Application configuration for SCI Viewer

use crate::render::ViewMode;
use crate::store::FirestoreConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tenant whose SCI collection is read
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,

    /// Presentation mode used when the detail view opens
    #[serde(default)]
    pub default_mode: ViewMode,

    /// Log file used while the terminal UI is active
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,

    /// Document store connection
    #[serde(default)]
    pub store: StoreConfig,
}

/// Firestore connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// REST endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Google Cloud project id
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Web API key (if required)
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_tenant_id() -> String {
    "AnmdYRpshMosqbsZ6l15".to_string()
}

fn default_endpoint() -> String {
    crate::store::DEFAULT_ENDPOINT.to_string()
}

fn default_project_id() -> String {
    "iclean-field-service-4bddd".to_string()
}

fn default_log_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("sciviewer").join("sciviewer.log"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project_id: default_project_id(),
            api_key: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tenant_id: default_tenant_id(),
            default_mode: ViewMode::default(),
            log_file: default_log_file(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sciviewer").join("config.toml"))
    }

    /// Load configuration from `path`, or the default location, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Firestore client settings derived from this configuration
    pub fn firestore(&self) -> FirestoreConfig {
        FirestoreConfig {
            endpoint: self.store.endpoint.clone(),
            project_id: self.store.project_id.clone(),
            api_key: self.store.api_key.clone(),
            ..Default::default()
        }
    }
}
