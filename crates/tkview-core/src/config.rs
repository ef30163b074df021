//! Configuration for TKView.
//!
//! Settings live in `~/.tkview/config.yaml`. Every field is optional in the
//! file; command-line flags and environment variables override what is read
//! here, and [`Config::validate`] runs on the merged result.
//!
//! ```yaml
//! api_url: https://api.testkube.io
//! token: tkcapi_0123456789
//! request_timeout_secs: 60
//! refresh_interval_secs: 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TkviewError};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8099";

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Testkube API
    pub api_url: String,

    /// Bearer token for the API
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Interval between workflow tree refreshes, 0 disables them
    pub refresh_interval_secs: u64,

    /// Directory for log files (defaults to ~/.tkview/logs/)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout_secs: 60,
            refresh_interval_secs: 30,
            log_dir: None,
        }
    }
}

impl Config {
    /// Default configuration file path, `~/.tkview/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tkview").join("config.yaml"))
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(TkviewError::ConfigInvalid {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| TkviewError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Override the API URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the log directory.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Check the merged configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(TkviewError::ConfigMissingField {
                field: "token".into(),
            });
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TkviewError::ConfigInvalid {
                path: Self::default_path().unwrap_or_default(),
                message: format!("api_url {:?} must start with http:// or https://", self.api_url),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(TkviewError::ConfigInvalid {
                path: Self::default_path().unwrap_or_default(),
                message: "request_timeout_secs must be greater than zero".into(),
            });
        }

        Ok(())
    }
}
