//! Configuration management for the field registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (fields.toml)
//! - Environment variables (FIELDS__*)
//!
//! ## Example config file (fields.toml):
//! ```toml
//! [registry]
//! path = "resources/field-definitions"
//! extension = ".json"
//!
//! [transform]
//! profile = "generic"
//!
//! [merge]
//! duplicates = "warn"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the field registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsConfig {
    /// Where fields-files live
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Transformation settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Merge settings
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Registry location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding the fields-files
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,

    /// Extension appended to file names that lack it
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Transformation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Profile used to expand raw input
    #[serde(default = "default_profile")]
    pub profile: String,
}

/// Merge settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// What a duplicate field name means for the command outcome.
///
/// Either way the duplicate is skipped and the rest of the batch is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Report and succeed
    #[default]
    Warn,
    /// Report and exit non-zero
    Strict,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("resources/field-definitions")
}

fn default_extension() -> String {
    ".json".to_string()
}

fn default_profile() -> String {
    crate::transform::GENERIC_PROFILE.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            extension: default_extension(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

impl FieldsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["fields.toml", ".fields.toml", "config/fields.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "fields") {
            let xdg_config = config_dir.config_dir().join("fields.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FIELDS__REGISTRY__PATH, FIELDS__MERGE__DUPLICATES, ...
        builder = builder.add_source(
            Environment::with_prefix("FIELDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the registry directory (resolves relative paths)
    pub fn registry_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }
}
