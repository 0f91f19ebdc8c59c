use crate::error::{Result, RollbookError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable carrying the deployment's backend URL.
pub const API_URL_ENV: &str = "ROLLBOOK_API_URL";

/// Configuration for rollbook, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbookConfig {
    /// Backend API URL, e.g. "http://localhost:8000/api"
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// How long a list query is served from cache before it is refetched
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long notifications stay visible
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_stale_time_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_toast_secs() -> u64 {
    4
}

impl Default for RollbookConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            stale_time_secs: default_stale_time_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            toast_secs: default_toast_secs(),
        }
    }
}

impl RollbookConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: RollbookConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Applies `ROLLBOOK_API_URL` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        let env_url = std::env::var(API_URL_ENV).ok();
        self.with_api_url_override(env_url.as_deref())
    }

    pub fn with_api_url_override(mut self, api_url: Option<&str>) -> Self {
        if let Some(url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.api_url = url.to_string();
        }
        self
    }

    /// The backend origin: `api_url` without a trailing `/api`.
    pub fn backend_host(&self) -> String {
        let url = self.api_url.trim_end_matches('/');
        url.strip_suffix("/api").unwrap_or(url).to_string()
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "api-url" => Ok(self.api_url.clone()),
            "stale-time" => Ok(self.stale_time_secs.to_string()),
            "request-timeout" => Ok(self.request_timeout_secs.to_string()),
            "toast-time" => Ok(self.toast_secs.to_string()),
            other => Err(RollbookError::Config(format!("Unknown config key: {}", other))),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let seconds = || {
            value
                .parse::<u64>()
                .map_err(|_| RollbookError::Config(format!("{} expects seconds, got {:?}", key, value)))
        };
        match key {
            "api-url" => self.api_url = value.to_string(),
            "stale-time" => self.stale_time_secs = seconds()?,
            "request-timeout" => self.request_timeout_secs = seconds()?,
            "toast-time" => self.toast_secs = seconds()?,
            other => {
                return Err(RollbookError::Config(format!("Unknown config key: {}", other)))
            }
        }
        Ok(())
    }

    pub const KEYS: [&'static str; 4] = ["api-url", "stale-time", "request-timeout", "toast-time"];
}
