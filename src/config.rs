//! Predictor settings loaded from `config.toml` in the app root.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! `IRIS_PREDICTOR_BASE_URL` overrides the configured service address.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::app_dirs;

/// Default filename used to store predictor settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that overrides [`PredictorConfig::base_url`].
pub const BASE_URL_ENV: &str = "IRIS_PREDICTOR_BASE_URL";

/// Address of the prediction service when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Upper bound on a single prediction exchange.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Largest response body accepted from the service.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Errors that may occur while loading or validating predictor settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The settings file is not valid TOML for [`PredictorConfig`].
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The service address is not an absolute http(s) URL with a host.
    #[error("Invalid prediction service address {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// A zero timeout would fail every request.
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
    /// A zero body limit would reject every response.
    #[error("Response size limit must be greater than zero")]
    ZeroResponseLimit,
}

/// Fixed transport configuration for the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Scheme, host and optional port of the service, e.g. `http://localhost:5000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Hard upper bound on waiting for a response, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl PredictorConfig {
    /// Build a config for `base_url` with default limits.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse and validate the configured service address.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url = Url::parse(self.base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        Ok(url)
    }

    /// `host:port` of the service, used in connection error messages.
    pub fn service_address(&self) -> Result<String, ConfigError> {
        let url = self.parsed_base_url()?;
        let host = url.host_str().unwrap_or_default();
        match url.port_or_known_default() {
            Some(port) => Ok(format!("{host}:{port}")),
            None => Ok(host.to_string()),
        }
    }

    /// Full URL of an endpoint path such as `/predict`.
    pub fn endpoint_url(&self, path: &str) -> Result<String, ConfigError> {
        let url = self.parsed_base_url()?;
        let base = url.as_str().trim_end_matches('/');
        Ok(format!("{base}/{}", path.trim_start_matches('/')))
    }

    /// Check every field, returning the config unchanged when valid.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.parsed_base_url()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::ZeroResponseLimit);
        }
        Ok(self)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        self
    }
}

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the app root, returning defaults if the file is missing.
pub fn load_or_default() -> Result<PredictorConfig, ConfigError> {
    let path = config_path()?;
    let config = load_from_path(&path)?;
    config
        .with_overrides(|key| std::env::var(key).ok())
        .validated()
}

/// Load settings from an explicit path without environment overrides.
pub fn load_from_path(path: &Path) -> Result<PredictorConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}; using defaults", path.display());
        return Ok(PredictorConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PredictorConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_ms = config.timeout_ms,
        "Loaded predictor config from {}",
        path.display()
    );
    Ok(config)
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}
