//! Token pair persisted as a small JSON document.
//!
//! The document holds the two fixed keys `access_token` and `refresh_token`
//! plus an `updated_at` timestamp. Writes go to a sibling temp file that is
//! renamed over the target, so readers see either the old pair or the new
//! pair and never a mix of both.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use paperlens_core::TokenStorage;
use paperlens_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use paperlens_domain::{ClientError, Result, TokenPair};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::InfraError;

const UPDATED_AT_KEY: &str = "updated_at";

/// [`TokenStorage`] writing to a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at `path`; the file is created on first store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<TokenPair>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token file");
                return Ok(None);
            }
            Err(err) => return Err(InfraError::from(err).into()),
        };

        let document: Value = serde_json::from_str(&contents).map_err(|err| {
            ClientError::Storage(format!("corrupt token file {}: {err}", self.path.display()))
        })?;

        let field = |key: &str| {
            document.get(key).and_then(Value::as_str).filter(|value| !value.is_empty())
        };
        match (field(ACCESS_TOKEN_KEY), field(REFRESH_TOKEN_KEY)) {
            (Some(access), Some(refresh)) => Ok(Some(TokenPair::new(access, refresh))),
            (None, None) => Ok(None),
            _ => {
                warn!(path = %self.path.display(), "discarding incomplete persisted token pair");
                Ok(None)
            }
        }
    }

    async fn store(&self, tokens: &TokenPair) -> Result<()> {
        let document = json!({
            ACCESS_TOKEN_KEY: tokens.access_token,
            REFRESH_TOKEN_KEY: tokens.refresh_token,
            UPDATED_AT_KEY: Utc::now().to_rfc3339(),
        });
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await.map_err(InfraError::from)?;
        restrict_permissions(&temp).await?;
        tokio::fs::rename(&temp, &self.path).await.map_err(InfraError::from)?;

        debug!(path = %self.path.display(), "token pair persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "token file removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|err| InfraError::from(err).into())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
