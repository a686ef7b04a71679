//! Configuration loading, validation, and management for Oxpecker.
//!
//! Loads configuration from `~/.oxpecker/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.oxpecker/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation backend (empty for local Ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat/classification model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Default temperature for answer generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for each external call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Session history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "llama3.1".into()
}
fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retrieval", &self.retrieval)
            .field("history", &self.history)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many passages a retrieval query returns
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunk size in characters for ingestion
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap in characters between adjacent chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_top_k() -> usize {
    10
}
fn default_chunk_size() -> usize {
    512
}
fn default_chunk_overlap() -> usize {
    64
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Token budget for trimmed history sent to the backend
    #[serde(default = "default_max_history_tokens")]
    pub max_tokens: usize,

    /// Sessions idle longer than this are eligible for eviction
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_max_history_tokens() -> usize {
    10240
}
fn default_session_ttl_secs() -> u64 {
    // 30 minutes, matching the session credential lifetime at the gateway.
    1800
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_history_tokens(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with env overrides.
    ///
    /// Environment variables checked:
    /// - `OXPECKER_API_KEY` (falls back to `OPENAI_API_KEY`)
    /// - `OXPECKER_BASE_URL`
    /// - `OXPECKER_MODEL`
    /// - `OXPECKER_EMBEDDING_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("OXPECKER_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(base_url) = std::env::var("OXPECKER_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(model) = std::env::var("OXPECKER_MODEL") {
            config.model = model;
        }

        if let Ok(model) = std::env::var("OXPECKER_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".oxpecker")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(ConfigError::ValidationError(
                "retrieval.chunk_overlap must be smaller than chunk_size".into(),
            ));
        }

        if self.history.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "history.max_tokens must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            retrieval: RetrievalConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
