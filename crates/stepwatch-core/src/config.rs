//! Configuration file loading.
//!
//! The collector reads a JSON file with one section per remote system:
//!
//! ```json
//! {
//!   "concourse": {
//!     "url": "https://ci.example.com",
//!     "team": "main",
//!     "username": "collector",
//!     "password": "secret"
//!   },
//!   "datadog": {
//!     "api-key": "...",
//!     "app-key": "...",
//!     "metric-prefix": "ci"
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CollectorError, Result};

/// Default Datadog API endpoint.
pub const DEFAULT_DATADOG_API_URL: &str = "https://api.datadoghq.com";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub concourse: ConcourseConfig,

    /// Only required when publishing to Datadog
    #[serde(default)]
    pub datadog: Option<DatadogConfig>,
}

/// Connection settings for the build server.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConcourseConfig {
    pub url: String,

    pub team: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Credentials for the metrics backend.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DatadogConfig {
    pub api_key: String,

    #[serde(default)]
    pub app_key: Option<String>,

    #[serde(default = "default_metric_prefix")]
    pub metric_prefix: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_metric_prefix() -> String {
    "concourse".to_string()
}

fn default_api_url() -> String {
    DEFAULT_DATADOG_API_URL.to_string()
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| CollectorError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_slice(&raw).map_err(|e| {
            CollectorError::configuration(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration path following the XDG Base
    /// Directory specification: `$XDG_CONFIG_HOME/stepwatch/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("stepwatch")
            .place_config_file("config.json")
            .map_err(|e| CollectorError::XdgDirectory(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.concourse.url.trim().is_empty() {
            return Err(CollectorError::configuration("concourse.url must not be empty"));
        }
        if self.concourse.team.trim().is_empty() {
            return Err(CollectorError::configuration("concourse.team must not be empty"));
        }
        if let Some(datadog) = &self.datadog {
            if datadog.api_key.trim().is_empty() {
                return Err(CollectorError::configuration(
                    "datadog.api-key must not be empty",
                ));
            }
        }
        Ok(())
    }
}
