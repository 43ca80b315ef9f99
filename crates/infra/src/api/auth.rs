//! Account and session operations
//!
//! Wraps the `/auth/*` endpoints on top of the authenticated
//! [`HttpClient`]. Token capture on login/refresh happens inside the client;
//! this service owns the "current user" half of the session.

use std::sync::Arc;

use paperlens_core::{HttpClient, SessionEvent};
use paperlens_domain::constants::{
    AUTH_LOGIN_PATH, AUTH_LOGOUT_PATH, AUTH_ME_PATH, AUTH_REGISTER_PATH,
};
use paperlens_domain::{
    RefreshTokenRequest, Result, TokenResponse, UserCredentials, UserInfo, UserUpdate,
};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

/// Authentication service
pub struct AuthService {
    http: Arc<HttpClient>,
    user: RwLock<Option<UserInfo>>,
}

impl AuthService {
    /// Service over a shared `HttpClient`; no user is loaded yet.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http, user: RwLock::new(None) }
    }

    /// Restore persisted tokens and, when a full pair exists, load the user.
    ///
    /// # Returns
    ///
    /// `true` if the session is usable after start-up.
    ///
    /// # Errors
    ///
    /// Returns an error only if the token storage cannot be read. A failure
    /// to load the user is logged and clears the restored tokens, both in
    /// memory and in storage.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<bool> {
        if !self.http.tokens().restore().await? {
            debug!("no persisted session");
            return Ok(false);
        }

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "failed to load user for restored session; clearing tokens");
                self.forget().await;
                Ok(false)
            }
        }
    }

    /// `true` when an access token is held and the user has been loaded.
    pub fn is_authenticated(&self) -> bool {
        self.http.tokens().has_tokens() && self.user.read().is_some()
    }

    /// Last loaded user, if the session is still live.
    pub fn user(&self) -> Option<UserInfo> {
        if !self.http.tokens().has_tokens() {
            return None;
        }
        self.user.read().clone()
    }

    /// Create an account and remember the returned user. Does not log in.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &UserCredentials) -> Result<UserInfo> {
        let user: UserInfo = self.http.post(AUTH_REGISTER_PATH, credentials).await?;
        *self.user.write() = Some(user.clone());
        info!(user_id = user.id, "account registered");
        Ok(user)
    }

    /// Log in and load the current user.
    ///
    /// Tokens are stored by the client as soon as the login response is
    /// unwrapped. If the user cannot be loaded afterwards the tokens are
    /// cleared again and the error is returned.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &UserCredentials) -> Result<UserInfo> {
        let _: TokenResponse = self.http.post(AUTH_LOGIN_PATH, credentials).await?;

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, "logged in");
                self.http.events().emit(SessionEvent::LoggedIn);
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "login succeeded but user could not be loaded");
                self.forget().await;
                Err(err)
            }
        }
    }

    /// Best-effort server logout; local state is always cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.http.tokens().refresh_token() {
            let body = RefreshTokenRequest { refresh_token };
            if let Err(err) = self.http.post_unit(AUTH_LOGOUT_PATH, Some(&body)).await {
                warn!(error = %err, "server logout failed");
            }
        }
        self.forget().await;
        self.http.events().emit(SessionEvent::LoggedOut);
        info!("logged out");
    }

    /// Force a token refresh and return the new access token.
    pub async fn refresh(&self) -> Result<String> {
        self.http.refresh_session().await
    }

    /// Fetch `GET /auth/me` and remember the result.
    pub async fn current_user(&self) -> Result<UserInfo> {
        let user: UserInfo = self.http.get(AUTH_ME_PATH).await?;
        *self.user.write() = Some(user.clone());
        Ok(user)
    }

    /// `PUT /auth/me`; the returned user replaces the loaded one.
    pub async fn update_current_user(&self, update: &UserUpdate) -> Result<UserInfo> {
        let user: UserInfo = self.http.put(AUTH_ME_PATH, update).await?;
        *self.user.write() = Some(user.clone());
        Ok(user)
    }

    /// Delete the account, then drop the local session.
    #[instrument(skip(self))]
    pub async fn delete_current_user(&self) -> Result<()> {
        self.http.delete(AUTH_ME_PATH).await?;
        self.forget().await;
        self.http.events().emit(SessionEvent::LoggedOut);
        info!("account deleted");
        Ok(())
    }

    async fn forget(&self) {
        self.user.write().take();
        if let Err(err) = self.http.tokens().clear().await {
            warn!(error = %err, "failed to clear persisted tokens");
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
