//! Agent Configuration
//!
//! Where the backend lives, where session state is kept, and the embedded
//! application settings. Loadable from TOML.

use anyhow::{Context, Result};
use finder_app::AppConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`AgentConfig::api_base_url`].
pub const API_URL_ENV: &str = "FINDER_API_URL";

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Resolve the default storage path for session state.
///
/// Priority:
/// 1. `$FINDER_PATH/.finder` if FINDER_PATH is set
/// 2. the platform data directory
/// 3. `~/.finder`
/// 4. `./.finder`
pub fn default_storage_path() -> PathBuf {
    if let Some(path) = std::env::var_os("FINDER_PATH") {
        return PathBuf::from(path).join(".finder");
    }
    dirs::data_dir()
        .map(|d| d.join("wildcats-finder"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".finder")))
        .unwrap_or_else(|| PathBuf::from(".finder"))
}

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// REST backend base URL, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory holding the session files
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Application core settings
    #[serde(default)]
    pub app: AppConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_path: default_storage_path(),
            request_timeout_secs: default_request_timeout_secs(),
            app: AppConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid agent configuration")
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file {}", path.display()))
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize agent configuration")
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.api_base_url = url;
        }
        self
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
