//! Session state: token persistence, logout notifications and refresh coordination

mod events;
mod refresh;
mod token_store;

pub use events::{SessionEvent, SessionEvents};
pub use refresh::{RefreshCoordinator, RefreshPhase};
pub use token_store::{MemoryTokenStorage, TokenStore};

use tracing::warn;

/// Clear the tokens and notify observers, once per live session.
///
/// Observers are only notified when this call actually removed a token
/// pair, so concurrent terminations produce a single `LogoutRequired`.
pub(crate) async fn terminate_session(tokens: &TokenStore, events: &SessionEvents, reason: &str) {
    match tokens.clear().await {
        Ok(true) => {
            warn!(reason, "session terminated; re-authentication required");
            events.emit(SessionEvent::LogoutRequired);
        }
        Ok(false) => {}
        Err(err) => {
            // Memory is already cleared at this point; only persistence failed.
            warn!(error = %err, reason, "failed to remove persisted tokens");
            events.emit(SessionEvent::LogoutRequired);
        }
    }
}
