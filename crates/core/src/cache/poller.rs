//! Background polling of server-side jobs into an [`EntityCache`].
//!
//! `start` claims the key in the cache before the job is created, so
//! concurrent starts for the same key result in a single server job. The
//! polling task owns the cache's load guard: whatever way the task ends,
//! the key leaves the loading state and its timer stops.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use paperlens_domain::{ClientError, JobSnapshot, JobStatus, Result};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::entity_cache::{Claim, EntityCache, LoadGuard, LoadSignal, Lookup};
use crate::ports::JobSource;

struct PollingTask {
    job_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

type TaskTable<K> = Arc<Mutex<HashMap<K, PollingTask>>>;

/// Drives server-side jobs to completion and stores their results in an [`EntityCache`].
pub struct AsyncTaskPoller<K, V> {
    cache: Arc<EntityCache<K, V>>,
    source: Arc<dyn JobSource<K, V>>,
    tasks: TaskTable<K>,
    interval: Duration,
}

impl<K, V> AsyncTaskPoller<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Poller checking job status every `interval` (at least 1ms).
    pub fn new(
        cache: Arc<EntityCache<K, V>>,
        source: Arc<dyn JobSource<K, V>>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Cache holding finished results and in-flight markers.
    pub fn cache(&self) -> &Arc<EntityCache<K, V>> {
        &self.cache
    }

    /// Start a job for `key` unless it is cached or already in flight.
    ///
    /// Returns `true` when a new job was created. The first status check
    /// happens immediately.
    #[instrument(skip(self), fields(cache = self.cache.name()))]
    pub async fn start(&self, key: K) -> Result<bool> {
        Ok(self.launch(key).await?.is_some())
    }

    /// Value for `key` once the in-flight job settles.
    ///
    /// `None` if nothing is cached or in flight, or if the job failed.
    pub async fn wait(&self, key: &K) -> Option<V> {
        match self.cache.lookup(key) {
            Lookup::Ready(value) => Some(value),
            Lookup::Loading(signal) => {
                let _ = signal.settled().await;
                self.cache.peek(key)
            }
            Lookup::Absent => None,
        }
    }

    /// Cached value, or start (or join) a job and wait for its result.
    ///
    /// # Errors
    /// The job's failure (`ClientError::JobFailed`, transport errors) or
    /// `ClientError::Cancelled` if the cache was cleared meanwhile.
    pub async fn fetch(&self, key: K) -> Result<V> {
        loop {
            let signal = match self.cache.lookup(&key) {
                Lookup::Ready(value) => return Ok(value),
                Lookup::Loading(signal) => signal,
                Lookup::Absent => match self.launch(key.clone()).await? {
                    Some(signal) => signal,
                    // Claimed by someone else in the meantime.
                    None => continue,
                },
            };
            signal.settled().await?;
            return self.cache.peek(&key).ok_or(ClientError::Cancelled);
        }
    }

    /// Cached value if present; otherwise wait for an in-flight job, or
    /// start one in the background and return `None`.
    pub async fn get_or_start(&self, key: K) -> Result<Option<V>> {
        match self.cache.lookup(&key) {
            Lookup::Ready(value) => Ok(Some(value)),
            Lookup::Loading(signal) => {
                let _ = signal.settled().await;
                Ok(self.cache.peek(&key))
            }
            Lookup::Absent => {
                self.start(key).await?;
                Ok(None)
            }
        }
    }

    /// `true` while a polling task runs for `key`.
    pub fn is_polling(&self, key: &K) -> bool {
        self.tasks.lock().contains_key(key)
    }

    /// Server job id being polled for `key`.
    pub fn job_id(&self, key: &K) -> Option<String> {
        self.tasks.lock().get(key).map(|task| task.job_id.clone())
    }

    /// Number of running polling tasks.
    pub fn active_tasks(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Stop every polling task. In-flight keys become absent.
    pub fn cancel_all(&self) {
        let tasks = self.tasks.lock();
        for task in tasks.values() {
            task.cancel.cancel();
        }
        if !tasks.is_empty() {
            info!(cache = self.cache.name(), cancelled = tasks.len(), "polling cancelled");
        }
    }

    async fn launch(&self, key: K) -> Result<Option<LoadSignal>> {
        let guard = match self.cache.begin(key.clone()) {
            Claim::Started(guard) => guard,
            Claim::Ready(_) | Claim::Loading(_) => {
                debug!(?key, "already cached or in flight");
                return Ok(None);
            }
        };
        let signal = guard.signal();

        let job_id = match self.source.start_job(&key).await {
            Ok(job_id) => job_id,
            Err(err) => {
                warn!(?key, error = %err, "failed to start job");
                guard.fail(err.clone());
                return Err(err);
            }
        };
        info!(?key, job_id = %job_id, "job started; polling");

        let cancel = guard.cancellation();
        let ticker = {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        };

        // Registration happens under the table lock so the task cannot
        // deregister before it is registered.
        let mut tasks = self.tasks.lock();
        let handle = tokio::spawn(drive(
            guard,
            job_id.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.tasks),
            ticker,
        ));
        if let Some(previous) = tasks.insert(key, PollingTask { job_id, cancel, handle }) {
            previous.cancel.cancel();
        }
        Ok(Some(signal))
    }
}

impl<K, V> Drop for AsyncTaskPoller<K, V> {
    fn drop(&mut self) {
        for task in self.tasks.lock().values() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }
}

async fn drive<K, V>(
    guard: LoadGuard<K, V>,
    job_id: String,
    source: Arc<dyn JobSource<K, V>>,
    tasks: TaskTable<K>,
    mut ticker: Interval,
) where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let cancel = guard.cancellation();

    let outcome = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break None,
            status = next_status(&mut ticker, source.as_ref(), &job_id) => {
                match status {
                    Ok(snapshot) => {
                        if let Some(outcome) = terminal_outcome(&job_id, snapshot) {
                            break Some(outcome);
                        }
                    }
                    Err(err) => {
                        warn!(job_id = %job_id, error = %err, "status check failed; stopping");
                        break Some(Err(err));
                    }
                }
            }
        }
    };

    {
        let mut tasks = tasks.lock();
        if tasks.get(guard.key()).is_some_and(|task| task.job_id == job_id) {
            tasks.remove(guard.key());
        }
    }

    match outcome {
        Some(Ok(value)) => {
            let stored = guard.complete(value);
            info!(job_id = %job_id, stored, "job completed");
        }
        Some(Err(err)) => {
            warn!(job_id = %job_id, error = %err, "job did not complete");
            guard.fail(err);
        }
        None => debug!(job_id = %job_id, "polling cancelled"),
    }
}

async fn next_status<K, V>(
    ticker: &mut Interval,
    source: &dyn JobSource<K, V>,
    job_id: &str,
) -> Result<JobSnapshot<V>>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    ticker.tick().await;
    source.job_status(job_id).await
}

fn terminal_outcome<V>(job_id: &str, snapshot: JobSnapshot<V>) -> Option<Result<V>> {
    match snapshot.status {
        JobStatus::Completed => Some(snapshot.result.ok_or_else(|| {
            ClientError::MalformedResponse(format!("job {job_id} completed without a result"))
        })),
        JobStatus::Failed => Some(Err(ClientError::JobFailed {
            job_id: job_id.to_owned(),
            reason: snapshot.error.unwrap_or_else(|| "unknown error".to_owned()),
        })),
        JobStatus::Pending | JobStatus::Processing => {
            trace!(job_id, status = %snapshot.status, "job still running");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_terminal_outcomes() {
        assert_eq!(terminal_outcome("t1", JobSnapshot::completed(3)), Some(Ok(3)));
        assert_eq!(terminal_outcome::<u32>("t1", JobSnapshot::pending()), None);
        assert_eq!(
            terminal_outcome::<u32>("t1", JobSnapshot::failed("quota exceeded")),
            Some(Err(ClientError::JobFailed { job_id: "t1".into(), reason: "quota exceeded".into() }))
        );
        assert!(matches!(
            terminal_outcome::<Value>(
                "t1",
                JobSnapshot { status: JobStatus::Completed, result: None, error: None }
            ),
            Some(Err(ClientError::MalformedResponse(_)))
        ));
    }
}
