//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read a `.env` file if one exists (values already set in the process
//!    environment win)
//! 2. Load from environment variables when `PAPERLENS_API_BASE_URL` is set
//! 3. Otherwise load the first config file found by [`probe_config_paths`]
//! 4. Otherwise use [`ClientConfig::default`]
//!
//! ## Environment Variables
//! - `PAPERLENS_API_BASE_URL`: Base URL of the catalog API (required for
//!   environment loading)
//! - `PAPERLENS_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `PAPERLENS_USER_AGENT`: User agent sent with every request
//! - `PAPERLENS_POLL_INTERVAL_MS`: Job polling interval in milliseconds
//! - `PAPERLENS_DETAIL_CHUNK_SIZE`: Concurrent detail fetches per batch chunk
//! - `PAPERLENS_SCORE_CHUNK_SIZE`: Concurrent score job starts per batch chunk
//! - `PAPERLENS_TOKEN_PATH`: Token file; `none` or `memory` keeps tokens in
//!   memory only
//! - `PAPERLENS_LOG_LEVEL`: Default log filter
//! - `PAPERLENS_LOG_FORMAT`: `pretty`, `compact` or `json`
//!
//! ## File Locations
//! `paperlens.{toml,json}` then `config.{toml,json}`, looked up in the
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use paperlens_domain::{ClientConfig, ClientError, LogFormat, Result};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["paperlens.toml", "paperlens.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ClientError::Config` if a configuration source exists but is
/// invalid. A missing source is not an error.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment incomplete, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path))?,
                None => {
                    tracing::info!("No config file found, using defaults");
                    ClientConfig::default()
                }
            }
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `PAPERLENS_API_BASE_URL` is required; every other variable is optional
/// and falls back to the default.
///
/// # Errors
/// Returns `ClientError::Config` if the base URL is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    config.api.base_url = env_var("PAPERLENS_API_BASE_URL")?;
    if let Some(timeout) = env_parse::<u64>("PAPERLENS_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }
    if let Ok(user_agent) = std::env::var("PAPERLENS_USER_AGENT") {
        config.api.user_agent = Some(user_agent);
    }
    if let Some(interval) = env_parse::<u64>("PAPERLENS_POLL_INTERVAL_MS")? {
        config.polling.interval_ms = interval;
    }
    if let Some(size) = env_parse::<usize>("PAPERLENS_DETAIL_CHUNK_SIZE")? {
        config.batch.detail_chunk_size = size;
    }
    if let Some(size) = env_parse::<usize>("PAPERLENS_SCORE_CHUNK_SIZE")? {
        config.batch.score_chunk_size = size;
    }
    if let Ok(path) = std::env::var("PAPERLENS_TOKEN_PATH") {
        config.storage.token_path = match path.to_ascii_lowercase().as_str() {
            "" | "none" | "memory" => None,
            _ => Some(PathBuf::from(path)),
        };
    }
    if let Ok(level) = std::env::var("PAPERLENS_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(format) = std::env::var("PAPERLENS_LOG_FORMAT") {
        config.logging.format = parse_log_format(&format)?;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Missing sections and
/// fields take their default values.
///
/// # Errors
/// Returns `ClientError::Config` if the file does not exist, no file is
/// found, or the content cannot be parsed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClientError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClientError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClientError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Check values that would only fail later, at first use.
///
/// # Errors
/// Returns `ClientError::Config` describing the first invalid value.
pub fn validate(config: &ClientConfig) -> Result<()> {
    let url = Url::parse(&config.api.base_url)
        .map_err(|e| ClientError::Config(format!("Invalid base URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!("Unsupported URL scheme: {}", url.scheme())));
    }
    if config.api.timeout_secs == 0 {
        return Err(ClientError::Config("Timeout must be greater than zero".into()));
    }
    if config.polling.interval_ms == 0 {
        return Err(ClientError::Config("Polling interval must be greater than zero".into()));
    }
    if config.batch.detail_chunk_size == 0 || config.batch.score_chunk_size == 0 {
        return Err(ClientError::Config("Batch chunk sizes must be greater than zero".into()));
    }
    Ok(())
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ClientError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ClientError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ClientError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        "json" => Ok(LogFormat::Json),
        other => Err(ClientError::Config(format!("Unknown log format: {}", other))),
    }
}
