use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::{env, fs, path::Path, time::Duration};

use humantime_serde::re::humantime;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the notes service, without the API prefix.
    pub base_url: String,
    pub api_prefix: String,
    /// Per-request timeout; `None` keeps the transport default.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub health_check_interval: Duration,
    /// Page size sent with every refresh, if set.
    pub page_limit: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            page_limit: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Full API root, e.g. `http://localhost:8080/api/v1`.
    #[must_use]
    pub fn api_url(&self) -> String {
        let prefix = self.api_prefix.trim_matches('/');
        let base = self.base_url.trim_end_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

pub fn load_from_file(path: &Path) -> Result<ClientConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
        path: path.display().to_string(),
        source,
    })
}

fn env_duration(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    env::var(var)
        .ok()
        .map(|raw| {
            humantime::parse_duration(&raw).map_err(|e| ConfigError::Env {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Applies `QUICKNOTES_*` variables on top of the defaults.
fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Ok(base_url) = env::var("QUICKNOTES_BASE_URL") {
        config.base_url = base_url;
    }
    if let Ok(prefix) = env::var("QUICKNOTES_API_PREFIX") {
        config.api_prefix = prefix;
    }
    if let Some(timeout) = env_duration("QUICKNOTES_TIMEOUT")? {
        config.timeout = Some(timeout);
    }
    if let Some(interval) = env_duration("QUICKNOTES_HEALTH_INTERVAL")? {
        config.health_check_interval = interval;
    }
    if let Ok(raw) = env::var("QUICKNOTES_PAGE_LIMIT") {
        let limit = raw.parse::<u32>().map_err(|e| ConfigError::Env {
            var: "QUICKNOTES_PAGE_LIMIT",
            reason: e.to_string(),
        })?;
        config.page_limit = Some(limit);
    }

    Ok(config)
}

pub fn load_config() -> Result<ClientConfig, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("QUICKNOTES_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        tracing::debug!("Loading config from '{}'", config_path);
        return load_from_file(Path::new(&config_path));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file(Path::new("config.yaml"));
    }

    // Fallback to environment variables
    tracing::debug!("No config file found, loading configuration from environment variables");
    load_from_env()
}
