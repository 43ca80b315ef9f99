//! Keyed caches with in-flight deduplication, async job polling and batching

mod batch;
mod entity_cache;
mod poller;

pub use batch::{BatchOrchestrator, BatchReport};
pub use entity_cache::{Claim, EntityCache, LoadGuard, LoadSignal, Lookup};
pub use poller::AsyncTaskPoller;
