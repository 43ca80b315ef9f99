use std::sync::Arc;

use async_trait::async_trait;
use paperlens_domain::{Result, TokenPair};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::ports::TokenStorage;

/// In-memory view of the token pair, backed by durable storage.
///
/// Reads are served from memory. Writes go to storage first so that
/// memory never holds a pair the next process start would not see.
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
    current: RwLock<Option<TokenPair>>,
}

impl TokenStore {
    /// Empty store backed by `storage`; call `restore` to load a saved pair.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage, current: RwLock::new(None) }
    }

    /// Store backed by [`MemoryTokenStorage`]; nothing survives the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::default()))
    }

    /// Load persisted tokens into memory.
    ///
    /// Returns `true` when a complete pair was found.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<bool> {
        let restored = self.storage.load().await?;
        let found = restored.is_some();
        *self.current.write() = restored;
        if found {
            info!("restored persisted session tokens");
        } else {
            debug!("no persisted session tokens");
        }
        Ok(found)
    }

    /// Current access token.
    pub fn access_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|pair| pair.access_token.clone())
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|pair| pair.refresh_token.clone())
    }

    /// Both tokens, if a pair is held.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.current.read().clone()
    }

    /// `true` while a complete pair is held in memory.
    pub fn has_tokens(&self) -> bool {
        self.current.read().is_some()
    }

    /// Persist and activate a new pair, replacing both tokens together.
    #[instrument(skip_all)]
    pub async fn save(&self, tokens: TokenPair) -> Result<()> {
        self.storage.store(&tokens).await?;
        *self.current.write() = Some(tokens);
        debug!("session tokens saved");
        Ok(())
    }

    /// Drop both tokens. Returns whether a pair was held in memory.
    ///
    /// Memory is cleared before storage, so readers stop seeing the pair
    /// even if persistence fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<bool> {
        let had_tokens = self.current.write().take().is_some();
        self.storage.clear().await?;
        debug!(had_tokens, "session tokens cleared");
        Ok(had_tokens)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("has_tokens", &self.has_tokens()).finish()
    }
}

/// Volatile [`TokenStorage`], used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStorage {
    /// Storage pre-seeded with `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self { slot: Mutex::new(Some(tokens)) }
    }

    /// Current persisted pair, bypassing any [`TokenStore`].
    pub fn snapshot(&self) -> Option<TokenPair> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> Result<Option<TokenPair>> {
        Ok(self.slot.lock().clone())
    }

    async fn store(&self, tokens: &TokenPair) -> Result<()> {
        *self.slot.lock() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
