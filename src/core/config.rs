//! Engine and server configuration

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::{
    DEFAULT_ADDR, DEFAULT_CORS_ORIGIN, DEFAULT_JUDGE_TIMEOUT_SECS, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL,
    MAX_TITLE_CHARS,
};

/// Tunables of the lifecycle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bound on one judge call; on expiry the request fails and the session stays put
    pub judge_timeout: Duration,
    pub max_title_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            judge_timeout: Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS),
            max_title_chars: MAX_TITLE_CHARS,
        }
    }
}

/// Where and how the OpenAI judge talks to its endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub url: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            url: DEFAULT_OPENAI_URL.to_string(),
        }
    }
}

/// Everything `run_server` needs
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    /// JSON file of users and their bearer tokens
    pub users_file: Option<PathBuf>,
    /// Origins answered with CORS headers
    pub cors_origins: Vec<String>,
    pub openai: OpenAiSettings,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            users_file: None,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            openai: OpenAiSettings::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Startup configuration failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid users file: {0}")]
    Users(String),

    #[error("invalid CORS origin {0:?}")]
    CorsOrigin(String),
}
