//! Configuration structures

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_DETAIL_CHUNK_SIZE, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SCORE_CHUNK_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_FILE,
};

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub batch: BatchConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is appended to (e.g. `https://host/api`)
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Async job polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl PollingConfig {
    /// Polling interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: DEFAULT_POLL_INTERVAL_MS }
    }
}

/// Batch fan-out configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Concurrent detail fetches per chunk
    pub detail_chunk_size: usize,
    /// Concurrent AI-score job starts per chunk
    pub score_chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            detail_chunk_size: DEFAULT_DETAIL_CHUNK_SIZE,
            score_chunk_size: DEFAULT_SCORE_CHUNK_SIZE,
        }
    }
}

/// Token persistence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File holding the persisted token pair; `None` keeps tokens in memory only
    pub token_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { token_path: Some(PathBuf::from(DEFAULT_TOKEN_FILE)) }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_client_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.polling.interval(), Duration::from_secs(2));
        assert_eq!(config.batch.detail_chunk_size, 5);
        assert_eq!(config.batch.score_chunk_size, 10);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://example.org/api"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://example.org/api");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.polling.interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let polling = PollingConfig { interval_ms: 0 };
        assert_eq!(polling.interval(), Duration::from_millis(1));
    }
}
