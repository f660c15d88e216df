//! Configuration file handling for the survey tool.
//!
//! The config picks the response store, the export destination and whether
//! selections are checked against the catalog. Every field has a default,
//! so an empty `{}` file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::Catalog;
use crate::store::{HttpStore, HttpStoreConfig, JsonFileStore, ResponseStore};
use crate::submission::AdmissionPolicy;

/// Default JSON store location
pub const DEFAULT_STORE_FILE: &str = "survey-responses.json";

/// Default export file prefix
pub const DEFAULT_BASE_NAME: &str = "mmesa-survey";

/// Where responses live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Local JSON document
    File { path: PathBuf },
    /// Survey REST API
    Api {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

impl StoreConfig {
    /// Open the configured backend
    pub fn open(&self) -> crate::error::Result<Box<dyn ResponseStore>> {
        match self {
            Self::File { path } => Ok(Box::new(JsonFileStore::open(path.clone()))),
            Self::Api {
                base_url,
                timeout_secs,
            } => {
                let store = HttpStore::new(HttpStoreConfig {
                    base_url: base_url.clone(),
                    timeout: Duration::from_secs(*timeout_secs),
                })?;
                Ok(Box::new(store))
            }
        }
    }

    /// Short description for logs and the TUI header
    pub fn describe(&self) -> String {
        match self {
            Self::File { path } => format!("file {}", path.display()),
            Self::Api { base_url, .. } => format!("api {}", base_url),
        }
    }
}

/// Export destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_base_name")]
    pub base_name: String,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_base_name() -> String {
    DEFAULT_BASE_NAME.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            base_name: default_base_name(),
        }
    }
}

/// Application configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    /// Reject selections the catalog does not offer
    #[serde(default = "default_enforce_catalog")]
    pub enforce_catalog: bool,
    /// Catalog JSON file; the built-in catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
}

fn default_enforce_catalog() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            export: ExportConfig::default(),
            enforce_catalog: default_enforce_catalog(),
            catalog: None,
        }
    }
}

impl AppConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.store {
            StoreConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    anyhow::bail!("Store file path must be specified");
                }
            }
            StoreConfig::Api {
                base_url,
                timeout_secs,
            } => {
                let url = base_url.trim();
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("API base URL must start with http:// or https://");
                }
                if *timeout_secs == 0 {
                    anyhow::bail!("API timeout must be at least 1 second");
                }
            }
        }

        let base = self.export.base_name.trim();
        if base.is_empty() {
            anyhow::bail!("Export base name must be specified");
        }
        if base.contains(['/', '\\']) {
            anyhow::bail!("Export base name cannot contain path separators");
        }

        Ok(())
    }

    pub fn admission_policy(&self) -> AdmissionPolicy {
        AdmissionPolicy {
            enforce_catalog: self.enforce_catalog,
        }
    }

    /// The configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load_from_file(path),
            None => Ok(Catalog::standard()),
        }
    }
}
