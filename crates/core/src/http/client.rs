//! Authenticated request pipeline.
//!
//! Every call attaches the current bearer token, unwraps the response
//! envelope and captures tokens from login/refresh responses. A 401 on an
//! ordinary call triggers a single-flight refresh followed by exactly one
//! retry with the new token.

use std::sync::Arc;

use async_trait::async_trait;
use paperlens_domain::constants::{AUTH_LOGIN_PATH, AUTH_REFRESH_PATH, AUTH_REGISTER_PATH};
use paperlens_domain::{ClientError, RefreshTokenRequest, Result, TokenPair, TokenResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::envelope::{decode, unwrap_envelope};
use super::request::{ApiRequest, HttpMethod, RawResponse};
use crate::auth::{terminate_session, RefreshCoordinator, SessionEvents, TokenStore};
use crate::ports::{TokenRefresher, Transport};

/// Authenticated client over a [`Transport`].
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    events: SessionEvents,
    coordinator: RefreshCoordinator,
}

impl HttpClient {
    /// Build a client whose refresh exchange goes through the same transport.
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenStore>, events: SessionEvents) -> Self {
        let refresher = Arc::new(TransportRefresher::new(Arc::clone(&transport)));
        Self::with_refresher(transport, tokens, events, refresher)
    }

    /// Build a client with a custom refresh exchange.
    pub fn with_refresher(
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenStore>,
        events: SessionEvents,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(Arc::clone(&tokens), refresher, events.clone());
        Self { transport, tokens, events, coordinator }
    }

    /// Token snapshot used to authorize requests.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Session event channel.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Refresh coordinator shared by every call.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Perform a call and return the unwrapped payload.
    ///
    /// # Errors
    /// - `ClientError::Network` / `Timeout` when the transport fails
    /// - `ClientError::Http` for non-success statuses (login/register 401 included)
    /// - `ClientError::Auth` when the session could not be recovered
    /// - `ClientError::MalformedResponse` when a login/refresh response lacks tokens
    #[instrument(skip(self, body, query), fields(method = %method, path = %path))]
    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<Value> {
        let request = ApiRequest::new(method, path).with_body(body).with_query(query.to_vec());
        let bearer = self.tokens.access_token();

        let mut response = self.send(&request, bearer.clone()).await?;
        if response.is_unauthorized() {
            response = self.recover_unauthorized(&request, response, bearer).await?;
        }

        if !response.is_success() {
            debug!(status = response.status, "request rejected");
            return Err(ClientError::http(response.status, response.body));
        }

        let payload = unwrap_envelope(response.body);
        if is_token_issuing(path) {
            self.capture_tokens(&payload).await?;
        }
        Ok(payload)
    }

    /// `GET path`, decoded as `R`.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        decode(self.call(HttpMethod::Get, path, None, &[]).await?)
    }

    /// `GET path` with query parameters, decoded as `R`.
    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R> {
        decode(self.call(HttpMethod::Get, path, None, query).await?)
    }

    /// `POST path` with a JSON body, decoded as `R`.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        decode(self.call(HttpMethod::Post, path, Some(body), &[]).await?)
    }

    /// POST whose response payload is irrelevant to the caller.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let body = body.map(serde_json::to_value).transpose()?;
        self.call(HttpMethod::Post, path, body, &[]).await.map(|_| ())
    }

    /// `PUT path` with a JSON body, decoded as `R`.
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        decode(self.call(HttpMethod::Put, path, Some(body), &[]).await?)
    }

    /// `DELETE path`, ignoring any payload.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.call(HttpMethod::Delete, path, None, &[]).await.map(|_| ())
    }

    /// Force a token refresh, sharing an in-flight exchange if there is one.
    pub async fn refresh_session(&self) -> Result<String> {
        self.coordinator.refresh().await
    }

    async fn send(&self, request: &ApiRequest, bearer: Option<String>) -> Result<RawResponse> {
        self.transport.execute(request.clone().with_bearer(bearer)).await
    }

    async fn recover_unauthorized(
        &self,
        request: &ApiRequest,
        response: RawResponse,
        stale: Option<String>,
    ) -> Result<RawResponse> {
        let path = request.path.as_str();

        // Bad credentials are an ordinary rejection, not an expired session.
        if is_credential_exchange(path) {
            return Ok(response);
        }

        if path == AUTH_REFRESH_PATH {
            warn!("refresh token rejected");
            terminate_session(&self.tokens, &self.events, "refresh token rejected").await;
            return Err(ClientError::Auth("refresh token rejected".into()));
        }

        debug!("access token rejected; refreshing");
        let token = self.coordinator.ensure_fresh_token(stale.as_deref()).await?;
        let retried = self.send(request, Some(token)).await?;

        if retried.is_unauthorized() {
            warn!("request still unauthorized after token refresh");
            terminate_session(&self.tokens, &self.events, "unauthorized after refresh").await;
            return Err(ClientError::Auth("request unauthorized after token refresh".into()));
        }
        Ok(retried)
    }

    async fn capture_tokens(&self, payload: &Value) -> Result<()> {
        let pair = token_pair_from(payload.clone())?;
        self.tokens.save(pair).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("tokens", &self.tokens)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

/// [`TokenRefresher`] posting to the refresh endpoint through a transport.
///
/// Goes to the transport directly so the exchange never re-enters the
/// 401 handling of [`HttpClient`].
pub struct TransportRefresher {
    transport: Arc<dyn Transport>,
}

impl TransportRefresher {
    /// Refresher posting to the refresh endpoint over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl TokenRefresher for TransportRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let body = serde_json::to_value(RefreshTokenRequest {
            refresh_token: refresh_token.to_owned(),
        })?;
        let request = ApiRequest::new(HttpMethod::Post, AUTH_REFRESH_PATH).with_body(Some(body));
        let response = self.transport.execute(request).await?;

        if response.is_unauthorized() {
            return Err(ClientError::Auth("refresh token rejected".into()));
        }
        if !response.is_success() {
            return Err(ClientError::http(response.status, response.body));
        }
        token_pair_from(unwrap_envelope(response.body))
    }
}

fn token_pair_from(payload: Value) -> Result<TokenPair> {
    let response: TokenResponse = serde_json::from_value(payload)
        .map_err(|err| ClientError::MalformedResponse(format!("invalid token response: {err}")))?;
    response
        .into_pair()
        .ok_or_else(|| ClientError::MalformedResponse("Invalid token response".into()))
}

fn is_credential_exchange(path: &str) -> bool {
    path == AUTH_LOGIN_PATH || path == AUTH_REGISTER_PATH
}

fn is_token_issuing(path: &str) -> bool {
    path == AUTH_LOGIN_PATH || path == AUTH_REFRESH_PATH
}
