//! Port interfaces implemented by infrastructure adapters

use async_trait::async_trait;
use paperlens_domain::{JobSnapshot, Result, TokenPair};

use crate::http::{ApiRequest, RawResponse};

/// Executes a single HTTP exchange against the catalog service.
///
/// Implementations must not retry on their own; transport failures are
/// reported as `ClientError::Network` / `ClientError::Timeout`. Any HTTP
/// status, including 401, is a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// Durable holder of the access/refresh token pair.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Load the persisted pair. A partially persisted pair reads as `None`.
    async fn load(&self) -> Result<Option<TokenPair>>;

    /// Persist both tokens together.
    async fn store(&self, tokens: &TokenPair) -> Result<()>;

    /// Remove both tokens together.
    async fn clear(&self) -> Result<()>;
}

/// Exchanges a refresh token for a new pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Returns `ClientError::Auth` when the refresh token is rejected and
    /// `ClientError::MalformedResponse` when the server omits a token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}

/// Server-side asynchronous job API for one kind of result.
#[async_trait]
pub trait JobSource<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Ask the server to start a job for `key`; returns the job id.
    async fn start_job(&self, key: &K) -> Result<String>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot<V>>;
}
