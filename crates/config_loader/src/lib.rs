//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON rule and destination configuration
//! - Pick the configuration source (object store or local bundle)
//! - Report non-fatal lint warnings
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("tattletail.toml")).unwrap();
//! println!("rules: {}", config.rules.len());
//! ```

mod parser;
mod source;
mod validator;

pub use contracts::Config;
pub use parser::ConfigFormat;
pub use source::{ConfigSource, BUNDLED_CONFIG, CONFIG_BUCKET_ENV, CONFIG_PATH_ENV};
pub use validator::lint;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    pub fn load_from_path(path: &Path) -> Result<Config, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContractError::config_load(path.display().to_string(), e.to_string()))?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Config, ContractError> {
        parser::parse(content, format)
    }

    /// Serialize a configuration to TOML
    pub fn to_toml(config: &Config) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a configuration to JSON
    pub fn to_json(config: &Config) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
