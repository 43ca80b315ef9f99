//! Shared fakes for core integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use paperlens_core::{ApiRequest, JobSource, RawResponse, Transport};
use paperlens_domain::{ClientError, JobSnapshot, Result};
use parking_lot::Mutex;

type Handler = dyn Fn(&ApiRequest) -> Result<RawResponse> + Send + Sync;

/// Transport answering from a closure and recording every request.
///
/// Yields once per request so concurrent callers interleave.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<RawResponse> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|request| request.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests.lock().push(request.clone());
        tokio::task::yield_now().await;
        (self.handler)(&request)
    }
}

/// Job source replaying a fixed sequence of statuses per job.
pub struct ScriptedJobSource<V> {
    scripts: Mutex<HashMap<String, VecDeque<JobSnapshot<V>>>>,
    starts: AtomicUsize,
    status_calls: AtomicUsize,
    fail_start: bool,
    fail_status: bool,
}

impl<V: Clone> ScriptedJobSource<V> {
    /// Every job created replays `script`; the last status repeats.
    pub fn new(script: Vec<JobSnapshot<V>>) -> Arc<Self> {
        let mut scripts = HashMap::new();
        scripts.insert(String::new(), script.into_iter().collect());
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            starts: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_start: false,
            fail_status: false,
        })
    }

    pub fn failing_start() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            starts: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_start: true,
            fail_status: false,
        })
    }

    /// Jobs start fine but every status check answers 500.
    pub fn failing_status() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            starts: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_start: false,
            fail_status: true,
        })
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<V> JobSource<String, V> for ScriptedJobSource<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn start_job(&self, key: &String) -> Result<String> {
        tokio::task::yield_now().await;
        if self.fail_start {
            return Err(ClientError::http(503, serde_json::Value::Null));
        }
        let n = self.starts.fetch_add(1, Ordering::SeqCst);
        let job_id = format!("job-{key}-{n}");
        let mut scripts = self.scripts.lock();
        let template = scripts.get("").cloned().unwrap_or_default();
        scripts.insert(job_id.clone(), template);
        Ok(job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot<V>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status {
            return Err(ClientError::http(500, serde_json::json!({"detail": "status unavailable"})));
        }
        let mut scripts = self.scripts.lock();
        let script = scripts
            .get_mut(job_id)
            .ok_or_else(|| ClientError::http(404, serde_json::Value::Null))?;
        let snapshot = if script.len() > 1 { script.pop_front() } else { script.front().cloned() };
        Ok(snapshot.unwrap_or_else(JobSnapshot::pending))
    }
}
