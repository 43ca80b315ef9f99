use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// Tokens were invalidated by the server; the UI should return to login.
    LogoutRequired,
}

/// Fan-out channel for [`SessionEvent`]s.
///
/// Cloning shares the channel. Emitting without subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Channel with no subscribers yet.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Broadcast `event`; dropped silently when nobody listens.
    pub fn emit(&self, event: SessionEvent) {
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(?event, receivers, "session event emitted");
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
