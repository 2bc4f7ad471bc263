//! Directory Configuration
//!
//! YAML configuration with camelCase keys. Every field has a default, so an
//! empty file (or no file at all) yields a working etcd-backed setup.
//!
//! ```yaml
//! database:
//!   driver: etcd
//!   endpoints: ["http://10.0.0.2:2379"]
//! keyspace:
//!   root: /v1beta
//! api:
//!   bindAddr: 0.0.0.0:50040
//! ```

use crate::error::{Error, Result};
use crate::store::key::DEFAULT_ROOT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// =============================================================================
// Sections
// =============================================================================

/// Backing store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// `memory` or `etcd`
    pub driver: String,
    pub endpoints: Vec<String>,
    pub username: String,
    pub password: String,
    /// Per-request timeout for network stores
    pub request_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "etcd".to_string(),
            endpoints: vec!["http://localhost:2379".to_string()],
            username: String::new(),
            password: String::new(),
            request_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyspaceConfig {
    /// Prefix of every key, normally the API version
    pub root: String,
}

impl Default for KeyspaceConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub metrics_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:50040".to_string(),
            metrics_addr: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriversConfig {
    /// Provisioning drivers to set up at startup
    pub enabled_backends: Vec<String>,
}

impl Default for DriversConfig {
    fn default() -> Self {
        Self {
            enabled_backends: vec!["sample".to_string()],
        }
    }
}

// =============================================================================
// Directory Config
// =============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryConfig {
    pub database: DatabaseConfig,
    pub keyspace: KeyspaceConfig,
    pub api: ApiConfig,
    pub drivers: DriversConfig,
}

impl DirectoryConfig {
    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text; empty text yields the defaults
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: DirectoryConfig = if text.trim().is_empty() {
            DirectoryConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.database.driver.to_lowercase().as_str() {
            "memory" => {}
            "etcd" => {
                if self.database.endpoints.is_empty() {
                    return Err(Error::Configuration(
                        "database.endpoints must not be empty for etcd".to_string(),
                    ));
                }
            }
            other => {
                return Err(Error::Configuration(format!(
                    "unknown database driver: {}",
                    other
                )))
            }
        }
        if !self.keyspace.root.starts_with('/') {
            return Err(Error::Configuration(format!(
                "keyspace.root must start with '/': {}",
                self.keyspace.root
            )));
        }
        if self.database.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "database.requestTimeoutSecs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
