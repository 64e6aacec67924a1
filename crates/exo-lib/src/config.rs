use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ANALYZE_PATH: &str = "/upload_and_analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_BACKEND_URL: &str = "EXO_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "EXO_TIMEOUT_SECS";
/// Optional path to a TOML config file, used by front ends without flags.
pub const ENV_CONFIG_PATH: &str = "EXO_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Where the analysis backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            analyze_path: DEFAULT_ANALYZE_PATH.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Defaults, then the optional file, then `EXO_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`ClientConfig::load`], taking the file path from `EXO_CONFIG`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(ENV_CONFIG_PATH).map(std::path::PathBuf::from);
        Self::load(path.as_deref())
    }

    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            self.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                reason: format!("'{raw}' is not a whole number of seconds"),
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: format!("'{}' must start with http:// or https://", self.base_url),
            });
        }
        if !self.analyze_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "analyze_path",
                reason: format!("'{}' must start with '/'", self.analyze_path),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.analyze_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
