//! Single-flight access token refresh.
//!
//! At most one refresh exchange is in flight per coordinator. Callers that
//! hit a 401 while a refresh is running are queued and receive the same
//! outcome, in arrival order, once the exchange settles.

use std::collections::VecDeque;
use std::sync::Arc;

use paperlens_domain::{ClientError, Result};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use super::{terminate_session, SessionEvents, TokenStore};
use crate::ports::TokenRefresher;

type Waiter = oneshot::Sender<Result<String>>;

/// Observable coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

enum RefreshState {
    Idle,
    Refreshing { waiters: VecDeque<Waiter> },
}

enum Entry {
    Lead(String),
    Follow(oneshot::Receiver<Result<String>>),
    Resolved(Result<String>),
}

/// Single-flight token refresh shared by every request of one client.
pub struct RefreshCoordinator {
    tokens: Arc<TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    events: SessionEvents,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Coordinator over `tokens`, refreshing through `refresher`.
    pub fn new(
        tokens: Arc<TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        events: SessionEvents,
    ) -> Self {
        Self { tokens, refresher, events, state: Mutex::new(RefreshState::Idle) }
    }

    /// Whether a refresh is in flight right now.
    pub fn phase(&self) -> RefreshPhase {
        match &*self.state.lock() {
            RefreshState::Idle => RefreshPhase::Idle,
            RefreshState::Refreshing { .. } => RefreshPhase::Refreshing,
        }
    }

    /// Number of callers queued behind the in-flight refresh.
    pub fn waiter_count(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Return an access token that supersedes `stale`.
    ///
    /// `stale` is the token the caller's rejected request carried. If the
    /// store already holds a different token, another refresh has completed
    /// since that request was sent and no new exchange is started.
    ///
    /// # Errors
    /// `ClientError::Auth` when no refresh token is held or the exchange
    /// fails; the session is terminated in the latter case.
    #[instrument(skip_all)]
    pub async fn ensure_fresh_token(&self, stale: Option<&str>) -> Result<String> {
        let entry = self.enter(stale, false);
        self.resolve(entry).await
    }

    /// Force a refresh exchange, joining one already in flight.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<String> {
        let entry = self.enter(None, true);
        self.resolve(entry).await
    }

    fn enter(&self, stale: Option<&str>, forced: bool) -> Entry {
        let mut state = self.state.lock();

        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            debug!(queued = waiters.len(), "refresh in flight; waiting for its outcome");
            return Entry::Follow(rx);
        }

        if !forced {
            if let Some(current) = self.tokens.access_token() {
                if stale != Some(current.as_str()) {
                    debug!("access token already replaced; skipping refresh");
                    return Entry::Resolved(Ok(current));
                }
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Entry::Resolved(Err(ClientError::Auth("no refresh token available".into())));
        };

        *state = RefreshState::Refreshing { waiters: VecDeque::new() };
        Entry::Lead(refresh_token)
    }

    async fn resolve(&self, entry: Entry) -> Result<String> {
        match entry {
            Entry::Resolved(outcome) => outcome,
            Entry::Follow(rx) => rx.await.unwrap_or(Err(ClientError::Cancelled)),
            Entry::Lead(refresh_token) => self.lead(&refresh_token).await,
        }
    }

    async fn lead(&self, refresh_token: &str) -> Result<String> {
        let mut pending = PendingSettle { coordinator: self, armed: true };
        info!("refreshing access token");

        let outcome = match self.refresher.refresh(refresh_token).await {
            Ok(pair) => {
                let access = pair.access_token.clone();
                self.tokens.save(pair).await.map(|()| access)
            }
            Err(err) => Err(err),
        };

        let outcome = match outcome {
            Ok(access) => {
                info!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                let err = match err {
                    ClientError::Auth(_) => err,
                    other => ClientError::Auth(format!("token refresh failed: {other}")),
                };
                warn!(error = %err, "token refresh failed");
                terminate_session(&self.tokens, &self.events, "token refresh failed").await;
                Err(err)
            }
        };

        pending.armed = false;
        self.settle(&outcome);
        outcome
    }

    fn settle(&self, outcome: &Result<String>) {
        let waiters = match std::mem::replace(&mut *self.state.lock(), RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => VecDeque::new(),
        };
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "releasing refresh waiters");
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("phase", &self.phase())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}

/// Releases queued waiters if the leading future is dropped mid-exchange.
struct PendingSettle<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for PendingSettle<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("refresh abandoned before completion");
            self.coordinator.settle(&Err(ClientError::Cancelled));
        }
    }
}
