//! Service configuration
//!
//! Read from a TOML file, with environment variables taking precedence:
//!
//! ```toml
//! slot_policy = "require_published"
//! seed_path = "data/seed.json"
//!
//! [storage]
//! backend = "file"
//! path = "data/schedule.json"
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::SlotPolicy;

/// Path of the TOML file read by [`BookingConfig::from_env`]
pub const CONFIG_PATH_VAR: &str = "BOOKING_CONFIG";
pub const STORAGE_BACKEND_VAR: &str = "BOOKING_STORAGE_BACKEND";
pub const STORAGE_PATH_VAR: &str = "BOOKING_STORAGE_PATH";
pub const SLOT_POLICY_VAR: &str = "BOOKING_SLOT_POLICY";
pub const SEED_PATH_VAR: &str = "BOOKING_SEED_PATH";

/// Where the schedule lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Lost when the process exits
    #[default]
    Memory,
    /// JSON snapshot rewritten after every change
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendType,
    /// Snapshot location, required by the file backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub slot_policy: SlotPolicy,
    /// JSON file with the initial users, rituals, appointments, availabilities and advice
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidVar { key: &'static str, value: String },
    #[error("the file storage backend requires storage.path")]
    MissingStoragePath,
}

impl BookingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the file named by `BOOKING_CONFIG` (defaults otherwise), then apply overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let base = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Apply `BOOKING_*` overrides read through `lookup`
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(STORAGE_BACKEND_VAR) {
            self.storage.backend = match value.to_ascii_lowercase().as_str() {
                "memory" => BackendType::Memory,
                "file" => BackendType::File,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        key: STORAGE_BACKEND_VAR,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(STORAGE_PATH_VAR) {
            self.storage.path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(SLOT_POLICY_VAR) {
            self.slot_policy = match value.to_ascii_lowercase().as_str() {
                "advisory" => SlotPolicy::Advisory,
                "require_published" => SlotPolicy::RequirePublished,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        key: SLOT_POLICY_VAR,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(SEED_PATH_VAR) {
            self.seed_path = Some(PathBuf::from(value));
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == BackendType::File && self.storage.path.is_none() {
            return Err(ConfigError::MissingStoragePath);
        }
        Ok(())
    }
}
