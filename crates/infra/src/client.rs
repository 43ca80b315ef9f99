//! Top-level client context
//!
//! [`PaperLensClient`] wires configuration, transport, token persistence,
//! the authenticated HTTP client, the API services and the paper store
//! into one object. It is the surface applications depend on.

use std::sync::Arc;

use paperlens_core::{
    HttpClient, MemoryTokenStorage, SessionEvent, SessionEvents, TokenStorage, TokenStore,
    Transport,
};
use paperlens_domain::{AiSummary, ClientConfig, PaperDetail, Result, UserCredentials, UserInfo};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::api::{AuthService, CollectionService, PaperService};
use crate::http::ReqwestTransport;
use crate::storage::FileTokenStorage;
use crate::store::PaperStore;

/// Entry point wiring transport, token storage, services and the paper store.
pub struct PaperLensClient {
    config: ClientConfig,
    http: Arc<HttpClient>,
    auth: AuthService,
    papers: PaperService,
    collections: CollectionService,
    store: PaperStore,
}

impl PaperLensClient {
    /// Build a client talking to `config.api.base_url` over reqwest.
    ///
    /// Tokens persist to `config.storage.token_path`, or live in memory
    /// when no path is configured.
    ///
    /// # Errors
    ///
    /// `ClientError::Config` if the HTTP transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::from_config(&config.api)?);
        let storage: Arc<dyn TokenStorage> = match &config.storage.token_path {
            Some(path) => Arc::new(FileTokenStorage::new(path.clone())),
            None => Arc::new(MemoryTokenStorage::default()),
        };
        Ok(Self::with_parts(config, transport, storage))
    }

    /// Build a client over caller-supplied adapters.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let tokens = Arc::new(TokenStore::new(storage));
        let http = Arc::new(HttpClient::new(transport, tokens, SessionEvents::new()));

        let papers = PaperService::new(Arc::clone(&http));
        let store = PaperStore::new(papers.clone(), config.polling.interval(), &config.batch);

        debug!(base_url = %config.api.base_url, "client assembled");
        Self {
            auth: AuthService::new(Arc::clone(&http)),
            collections: CollectionService::new(Arc::clone(&http)),
            papers,
            store,
            http,
            config,
        }
    }

    /// Restore a persisted session. Returns `true` if the user is logged in.
    pub async fn initialize(&self) -> Result<bool> {
        let restored = self.auth.initialize().await?;
        info!(authenticated = restored, "client initialised");
        Ok(restored)
    }

    /// Configuration the client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared request pipeline.
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Auth endpoints and session state.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Paper endpoints, uncached.
    pub fn papers(&self) -> &PaperService {
        &self.papers
    }

    /// Collection endpoints.
    pub fn collections(&self) -> &CollectionService {
        &self.collections
    }

    /// Cached paper details and polled jobs.
    pub fn store(&self) -> &PaperStore {
        &self.store
    }

    /// `true` when tokens are held and the user is loaded.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Loaded user of the live session.
    pub fn current_user(&self) -> Option<UserInfo> {
        self.auth.user()
    }

    /// Log in and load the current user.
    pub async fn login(&self, credentials: &UserCredentials) -> Result<UserInfo> {
        self.auth.login(credentials).await
    }

    /// Log out and drop every cached paper and running job.
    pub async fn logout(&self) {
        self.auth.logout().await;
        self.store.clear_cache();
    }

    /// Force a token refresh; returns the new access token.
    pub async fn refresh(&self) -> Result<String> {
        self.auth.refresh().await
    }

    /// Paper detail through the deduplicating cache.
    pub async fn get_paper_detail(&self, arxiv_id: &str) -> Result<PaperDetail> {
        self.store.get_paper_detail(arxiv_id).await
    }

    /// Cached AI score, or `None` while a scoring job runs in the background.
    pub async fn get_ai_score(&self, arxiv_id: &str) -> Result<Option<AiSummary>> {
        self.store.get_ai_score(arxiv_id).await
    }

    /// Session notifications, including [`SessionEvent::LogoutRequired`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.http.events().subscribe()
    }
}

impl std::fmt::Debug for PaperLensClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperLensClient")
            .field("base_url", &self.config.api.base_url)
            .field("auth", &self.auth)
            .field("store", &self.store)
            .finish()
    }
}
