//! Client configuration.
//!
//! Settings are layered: built-in defaults, then `~/.ragchat/config.json`
//! when it exists, then `RAGCHAT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ChatError, ChatResult};
use crate::models::DEFAULT_PROMPT_NAME;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const CONFIG_DIR: &str = ".ragchat";
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "RAGCHAT_API_URL";
pub const ENV_PROMPT: &str = "RAGCHAT_PROMPT";
pub const ENV_COLLECTION: &str = "RAGCHAT_COLLECTION";
pub const ENV_STREAM_TIMEOUT: &str = "RAGCHAT_STREAM_TIMEOUT_SECS";

/// Configuration for talking to the RAG backend.
///
/// # Example
///
/// ```
/// use ragchat::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_api_url("http://rag.local:8000/")
///     .with_default_collection("manuals");
/// assert_eq!(config.api_url, "http://rag.local:8000");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Prompt template name sent with every chat request
    pub prompt_name: String,
    /// Collection selected when a chat starts
    pub default_collection: Option<String>,
    /// Give up on a chat stream after this many silent seconds
    pub stream_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            prompt_name: DEFAULT_PROMPT_NAME.to_string(),
            default_collection: None,
            stream_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend URL. Trailing slashes are dropped.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = normalize_url(&url.into());
        self
    }

    pub fn with_prompt_name(mut self, name: impl Into<String>) -> Self {
        self.prompt_name = name.into();
        self
    }

    pub fn with_default_collection(mut self, name: impl Into<String>) -> Self {
        self.default_collection = Some(name.into());
        self
    }

    /// Bound how long a chat stream may stay silent.
    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Idle timeout for chat streams, if one is configured.
    pub fn stream_idle_timeout(&self) -> Option<Duration> {
        self.stream_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Location of the user config file.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Read a config file. Fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> ChatResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ChatError::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
        })?;
        let api_url = config.api_url.clone();
        Ok(config.with_api_url(api_url))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> ChatResult<Self> {
        Self::default().apply_env()
    }

    /// Full layered load: defaults, user file, environment.
    pub fn load() -> ChatResult<Self> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Layered load using an explicit file location.
    ///
    /// A missing file is skipped; an unreadable or invalid one is an error.
    pub fn load_from(path: Option<&Path>) -> ChatResult<Self> {
        let base = match path {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            _ => Self::default(),
        };
        base.apply_env()
    }

    /// Override fields from `RAGCHAT_*` environment variables.
    ///
    /// Empty values are ignored.
    pub fn apply_env(mut self) -> ChatResult<Self> {
        if let Some(url) = env_value(ENV_API_URL) {
            self = self.with_api_url(url);
        }
        if let Some(prompt) = env_value(ENV_PROMPT) {
            self.prompt_name = prompt;
        }
        if let Some(collection) = env_value(ENV_COLLECTION) {
            self.default_collection = Some(collection);
        }
        if let Some(raw) = env_value(ENV_STREAM_TIMEOUT) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ChatError::Config {
                message: format!("{} must be a number of seconds, got {:?}", ENV_STREAM_TIMEOUT, raw),
            })?;
            self.stream_timeout_secs = Some(secs);
        }
        Ok(self)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
