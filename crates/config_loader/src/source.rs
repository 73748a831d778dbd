//! Configuration source selection
//!
//! The rules file comes from the object store when both the bucket and the
//! path are configured, otherwise from the local bundle.

use std::fmt;
use std::path::{Path, PathBuf};

use contracts::{Config, ContractError, ObjectStore};
use tracing::info;

use crate::parser::{self, ConfigFormat};

/// File name of the configuration shipped next to the binary
pub const BUNDLED_CONFIG: &str = "tattletail.toml";

/// Environment variable naming the configuration bucket
pub const CONFIG_BUCKET_ENV: &str = "S3_CONFIG_BUCKET";

/// Environment variable naming the configuration object key
pub const CONFIG_PATH_ENV: &str = "S3_CONFIG_PATH";

/// Where the rules file is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    ObjectStore { bucket: String, path: String },
    LocalFile(PathBuf),
}

impl ConfigSource {
    /// Object store when both `bucket` and `path` are non-empty, else `fallback`
    pub fn resolve(bucket: Option<&str>, path: Option<&str>, fallback: impl Into<PathBuf>) -> Self {
        match (bucket, path) {
            (Some(bucket), Some(path)) if !bucket.is_empty() && !path.is_empty() => {
                Self::ObjectStore {
                    bucket: bucket.to_string(),
                    path: path.to_string(),
                }
            }
            _ => Self::LocalFile(fallback.into()),
        }
    }

    /// Resolve from `S3_CONFIG_BUCKET` / `S3_CONFIG_PATH`
    pub fn from_env(fallback: impl Into<PathBuf>) -> Self {
        let bucket = std::env::var(CONFIG_BUCKET_ENV).ok();
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::resolve(bucket.as_deref(), path.as_deref(), fallback)
    }

    /// Format inferred from the path's extension; TOML when unknown
    pub fn format(&self) -> ConfigFormat {
        let ext = match self {
            Self::ObjectStore { path, .. } => Path::new(path).extension(),
            Self::LocalFile(path) => path.extension(),
        };
        ext.and_then(|e| e.to_str())
            .and_then(ConfigFormat::from_extension)
            .unwrap_or_default()
    }

    /// Read and parse the configuration
    ///
    /// # Errors
    /// `ConfigLoad` when the text cannot be read, `ConfigParse` when it
    /// cannot be parsed.
    pub async fn load(&self, store: &dyn ObjectStore) -> Result<Config, ContractError> {
        let content = match self {
            Self::ObjectStore { bucket, path } => {
                info!(bucket = %bucket, path = %path, "Loading config from object store");
                let bytes = store
                    .get_object(bucket, path)
                    .await
                    .map_err(|e| ContractError::config_load(self.to_string(), e.to_string()))?;
                String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ContractError::config_load(self.to_string(), format!("config is not UTF-8: {e}"))
                })?
            }
            Self::LocalFile(path) => {
                info!(path = %path.display(), "Loading bundled config");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ContractError::config_load(self.to_string(), e.to_string()))?
            }
        };
        parser::parse(&content, self.format())
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectStore { bucket, path } => write!(f, "s3://{bucket}/{path}"),
            Self::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}
