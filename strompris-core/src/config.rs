//! TOML configuration shared by the CLI and the dashboard.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [source]
//! base_url = "https://www.hvakosterstrommen.no/api/v1/prices"
//! timeout_secs = 10
//!
//! [dataset]
//! path = "strompriser_dataset.csv"
//!
//! [dashboard]
//! zone = "NO1"
//! currency = "NOK"
//! lookback_days = 0
//! ```

use crate::domain::{Currency, Zone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.hvakosterstrommen.no/api/v1/prices";
pub const DEFAULT_DATASET_PATH: &str = "strompriser_dataset.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Upstream API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: concat!("strompris/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Durable dataset location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
        }
    }
}

/// Initial dashboard selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub zone: Zone,
    pub currency: Currency,
    /// Days before today the default date range starts.
    pub lookback_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            zone: Zone::No1,
            currency: Currency::Nok,
            lookback_days: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StromprisConfig {
    pub source: SourceConfig,
    pub dataset: DatasetConfig,
    pub dashboard: DashboardConfig,
}

impl StromprisConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.base_url is empty".into()));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = StromprisConfig::from_toml("").unwrap();
        assert_eq!(config, StromprisConfig::default());
        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.source.timeout(), Duration::from_secs(10));
        assert_eq!(config.dataset.path, PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = StromprisConfig::from_toml(
            r#"
[source]
timeout_secs = 3

[dashboard]
zone = "NO4"
currency = "EUR"
"#,
        )
        .unwrap();
        assert_eq!(config.source.timeout_secs, 3);
        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.dashboard.zone, Zone::No4);
        assert_eq!(config.dashboard.currency, Currency::Eur);
        assert_eq!(config.dashboard.lookback_days, 0);
    }

    #[test]
    fn unknown_zone_fails_to_parse() {
        let err = StromprisConfig::from_toml("[dashboard]\nzone = \"NO9\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = StromprisConfig::from_toml("[source]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = StromprisConfig::from_file(Path::new("/nonexistent/strompris.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(StromprisConfig::load(None).is_ok());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = StromprisConfig::default();
        config.dataset.path = PathBuf::from("/tmp/prices.csv");
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(StromprisConfig::from_toml(&text).unwrap(), config);
    }
}
