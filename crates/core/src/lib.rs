//! # PaperLens Core
//!
//! Coordination logic of the client - no transport or storage code.
//!
//! This crate contains:
//! - Port interfaces (traits) for the transport, token persistence and
//!   server-side job sources
//! - The request pipeline with single-flight token refresh
//! - The entity cache, async job poller and batch orchestrator
//!
//! ## Architecture Principles
//! - Only depends on `paperlens-domain`
//! - All I/O behind traits implemented in `paperlens-infra`
//! - Every shared structure is an explicit instance, never a global

pub mod auth;
pub mod cache;
pub mod http;
pub mod ports;

pub use auth::{
    MemoryTokenStorage, RefreshCoordinator, RefreshPhase, SessionEvent, SessionEvents, TokenStore,
};
pub use cache::{
    AsyncTaskPoller, BatchOrchestrator, BatchReport, Claim, EntityCache, LoadGuard, LoadSignal,
    Lookup,
};
pub use http::{
    decode, unwrap_envelope, ApiRequest, HttpClient, HttpMethod, RawResponse, TransportRefresher,
};
pub use ports::{JobSource, TokenRefresher, TokenStorage, Transport};
