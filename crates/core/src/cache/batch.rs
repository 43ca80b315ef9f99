//! Chunked bulk loading.
//!
//! Keys are filtered (duplicates and keys the caller reports as cached or
//! in flight are skipped), split into fixed-size chunks and fetched chunk
//! by chunk. Requests within a chunk run concurrently; a chunk finishes
//! completely before the next one starts. Individual failures are logged
//! and counted, never propagated.

use std::collections::HashSet;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use futures::future::join_all;
use paperlens_domain::Result;
use tracing::{debug, info, warn};

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<K> {
    /// Keys actually requested
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Duplicates plus keys already cached or in flight
    pub skipped: usize,
    /// Failed keys with their error message
    pub errors: Vec<(K, String)>,
}

impl<K> Default for BatchReport<K> {
    fn default() -> Self {
        Self { dispatched: 0, succeeded: 0, failed: 0, skipped: 0, errors: Vec::new() }
    }
}

/// Runs per-key fetches in sequential chunks of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct BatchOrchestrator {
    chunk_size: usize,
}

impl BatchOrchestrator {
    /// Orchestrator with at most `chunk_size` requests in flight; zero means one.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }

    /// Keys fetched concurrently per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fetch every key not rejected by `skip`, `chunk_size` at a time.
    pub async fn run<K, T, S, F, Fut>(&self, keys: Vec<K>, skip: S, fetch_one: F) -> BatchReport<K>
    where
        K: Eq + Hash + Clone + Debug,
        S: Fn(&K) -> bool,
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let requested = keys.len();
        let mut seen = HashSet::with_capacity(requested);
        let pending: Vec<K> =
            keys.into_iter().filter(|key| seen.insert(key.clone()) && !skip(key)).collect();

        let mut report =
            BatchReport { skipped: requested - pending.len(), ..BatchReport::default() };
        if pending.is_empty() {
            debug!(requested, "nothing to fetch");
            return report;
        }

        for (index, chunk) in pending.chunks(self.chunk_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "dispatching chunk");
            let outcomes = join_all(chunk.iter().cloned().map(|key| {
                let request = fetch_one(key.clone());
                async move { (key, request.await) }
            }))
            .await;

            for (key, outcome) in outcomes {
                report.dispatched += 1;
                match outcome {
                    Ok(_) => report.succeeded += 1,
                    Err(err) => {
                        warn!(?key, error = %err, "batch item failed");
                        report.failed += 1;
                        report.errors.push((key, err.to_string()));
                    }
                }
            }
        }

        info!(
            dispatched = report.dispatched,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "batch finished"
        );
        report
    }
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(paperlens_domain::constants::DEFAULT_DETAIL_CHUNK_SIZE)
    }
}
