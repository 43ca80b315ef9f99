//! Keyed value cache with per-key in-flight tracking.
//!
//! Each key is in exactly one state: absent, loading or ready. A load is
//! claimed atomically by [`EntityCache::begin`]; the returned [`LoadGuard`]
//! owns the loading state and clears it on every exit path, including drop.
//! Concurrent callers for the same key get a [`LoadSignal`] and re-check the
//! cache once the load settles.
//!
//! Failed loads are not cached: the next caller starts a new load.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use paperlens_domain::{ClientError, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

type Outcome = std::result::Result<(), ClientError>;

enum Slot<V> {
    Loading { signal: watch::Receiver<Option<Outcome>>, cancel: CancellationToken, generation: u64 },
    Ready(V),
}

struct CacheState<K, V> {
    slots: HashMap<K, Slot<V>>,
    next_generation: u64,
}

/// Result of a non-claiming lookup
pub enum Lookup<V> {
    Ready(V),
    Loading(LoadSignal),
    Absent,
}

/// Result of [`EntityCache::begin`]
pub enum Claim<K, V>
where
    K: Eq + Hash + Clone,
{
    Ready(V),
    Loading(LoadSignal),
    /// The caller now owns the load for this key.
    Started(LoadGuard<K, V>),
}

/// Completion signal of an in-flight load.
pub struct LoadSignal(watch::Receiver<Option<Outcome>>);

impl LoadSignal {
    /// Wait for the load to settle.
    ///
    /// `Err(ClientError::Cancelled)` when the load was abandoned or the
    /// cache was cleared underneath it.
    pub async fn settled(mut self) -> Outcome {
        let outcome = match self.0.wait_for(Option::is_some).await {
            Ok(current) => current.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or(Err(ClientError::Cancelled))
    }
}

/// Cache of `V` by `K` that deduplicates concurrent loads.
pub struct EntityCache<K, V> {
    name: &'static str,
    state: Arc<Mutex<CacheState<K, V>>>,
}

impl<K, V> EntityCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// `name` only labels log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(CacheState { slots: HashMap::new(), next_generation: 0 })),
        }
    }

    /// Label used in log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state of `key` without claiming a load.
    pub fn lookup(&self, key: &K) -> Lookup<V> {
        match self.state.lock().slots.get(key) {
            Some(Slot::Ready(value)) => Lookup::Ready(value.clone()),
            Some(Slot::Loading { signal, .. }) => Lookup::Loading(LoadSignal(signal.clone())),
            None => Lookup::Absent,
        }
    }

    /// Cached value without waiting on or starting a load.
    pub fn peek(&self, key: &K) -> Option<V> {
        match self.state.lock().slots.get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// `true` if a value is ready for `key`.
    pub fn contains(&self, key: &K) -> bool {
        matches!(self.state.lock().slots.get(key), Some(Slot::Ready(_)))
    }

    /// `true` while a load for `key` is in flight.
    pub fn is_loading(&self, key: &K) -> bool {
        matches!(self.state.lock().slots.get(key), Some(Slot::Loading { .. }))
    }

    /// Ready or loading; such keys need no new request.
    pub fn is_cached_or_loading(&self, key: &K) -> bool {
        self.state.lock().slots.contains_key(key)
    }

    /// Number of ready entries.
    pub fn len(&self) -> usize {
        self.state.lock().slots.values().filter(|slot| matches!(slot, Slot::Ready(_))).count()
    }

    /// `true` when no value is ready.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys with a load in flight.
    pub fn loading_keys(&self) -> Vec<K> {
        self.state
            .lock()
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Loading { .. }))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Return the cached value, join an in-flight load, or claim a new one.
    pub fn begin(&self, key: K) -> Claim<K, V> {
        let mut state = self.state.lock();
        match state.slots.get(&key) {
            Some(Slot::Ready(value)) => return Claim::Ready(value.clone()),
            Some(Slot::Loading { signal, .. }) => return Claim::Loading(LoadSignal(signal.clone())),
            None => {}
        }

        let generation = state.next_generation;
        state.next_generation += 1;
        let (sender, signal) = watch::channel(None);
        let cancel = CancellationToken::new();
        state
            .slots
            .insert(key.clone(), Slot::Loading { signal, cancel: cancel.clone(), generation });
        trace!(cache = self.name, ?key, generation, "load claimed");

        Claim::Started(LoadGuard {
            state: Arc::clone(&self.state),
            key,
            generation,
            sender,
            cancel,
            settled: false,
        })
    }

    /// Store a value directly, superseding any in-flight load for the key.
    pub fn put(&self, key: K, value: V) {
        let previous = self.state.lock().slots.insert(key, Slot::Ready(value));
        if let Some(Slot::Loading { cancel, .. }) = previous {
            cancel.cancel();
        }
    }

    /// Cached value or the result of a deduplicated `fetch`.
    ///
    /// At most one `fetch` per key is in flight across all callers. When a
    /// joined load fails, waiters re-check and one of them retries.
    ///
    /// # Errors
    /// The error of `fetch`, or `ClientError::Cancelled` when the cache is
    /// cleared or the key overwritten while the fetch is pending. The
    /// pending fetch is dropped in that case.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        loop {
            match self.begin(key.clone()) {
                Claim::Ready(value) => {
                    trace!(cache = self.name, ?key, "cache hit");
                    return Ok(value);
                }
                Claim::Loading(signal) => {
                    debug!(cache = self.name, ?key, "joining in-flight load");
                    // Re-check the cache whatever the outcome.
                    let _ = signal.settled().await;
                }
                Claim::Started(guard) => {
                    // Clearing or overwriting the key drops the pending fetch.
                    let cancel = guard.cancellation();
                    let outcome = tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            debug!(cache = self.name, ?key, "load cancelled");
                            Err(ClientError::Cancelled)
                        }
                        result = fetch(key.clone()) => result,
                    };
                    return match outcome {
                        Ok(value) => {
                            guard.complete(value.clone());
                            Ok(value)
                        }
                        Err(err) => {
                            guard.fail(err.clone());
                            Err(err)
                        }
                    };
                }
            }
        }
    }

    /// Drop every entry and cancel every in-flight load.
    ///
    /// Loads that finish afterwards do not repopulate the cache.
    pub fn clear(&self) {
        let drained: Vec<Slot<V>> = self.state.lock().slots.drain().map(|(_, slot)| slot).collect();
        let mut cancelled = 0usize;
        for slot in &drained {
            if let Slot::Loading { cancel, .. } = slot {
                cancel.cancel();
                cancelled += 1;
            }
        }
        info!(cache = self.name, entries = drained.len(), cancelled, "cache cleared");
    }
}

/// Ownership of one in-flight load.
///
/// Dropping an unsettled guard clears the loading state and releases
/// waiters with `ClientError::Cancelled`.
pub struct LoadGuard<K, V>
where
    K: Eq + Hash + Clone,
{
    state: Arc<Mutex<CacheState<K, V>>>,
    key: K,
    generation: u64,
    sender: watch::Sender<Option<Outcome>>,
    cancel: CancellationToken,
    settled: bool,
}

impl<K, V> LoadGuard<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Key this load is for.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Cancelled when the cache is cleared or the key is overwritten.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// A signal for this load, independent of the cache slot.
    pub fn signal(&self) -> LoadSignal {
        LoadSignal(self.sender.subscribe())
    }

    /// Store the loaded value. Returns `false` if the slot was cleared or
    /// superseded meanwhile, in which case the value is discarded.
    pub fn complete(mut self, value: V) -> bool {
        let stored = {
            let mut state = self.state.lock();
            if self.owns_slot(&state) {
                state.slots.insert(self.key.clone(), Slot::Ready(value));
                true
            } else {
                false
            }
        };
        self.settle(Ok(()));
        stored
    }

    /// Abandon the load with an error. Nothing is cached.
    pub fn fail(mut self, error: ClientError) {
        self.release_slot();
        self.settle(Err(error));
    }

    fn owns_slot(&self, state: &CacheState<K, V>) -> bool {
        matches!(
            state.slots.get(&self.key),
            Some(Slot::Loading { generation, .. }) if *generation == self.generation
        )
    }

    fn release_slot(&self) {
        let mut state = self.state.lock();
        if self.owns_slot(&state) {
            state.slots.remove(&self.key);
        }
    }

    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.sender.send_replace(Some(outcome));
    }
}

impl<K, V> Drop for LoadGuard<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        if !self.settled {
            self.release_slot();
            self.settle(Err(ClientError::Cancelled));
        }
    }
}
