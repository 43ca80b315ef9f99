//! Paper detail and AI score caches
//!
//! Details are fetched synchronously through a deduplicating
//! [`EntityCache`]; AI scores and translations are server-side jobs driven
//! to completion by an [`AsyncTaskPoller`]. Batch variants fan out in
//! bounded chunks and skip anything already cached or in flight.

use std::sync::Arc;
use std::time::Duration;

use paperlens_core::{AsyncTaskPoller, BatchOrchestrator, BatchReport, EntityCache};
use paperlens_domain::{
    AiSummary, BatchConfig, PaperDetail, Result, TranslateRequest, TranslationResult,
};
use tracing::{info, instrument};

use crate::api::{AiScoreJobs, PaperService, TranslationJobs};

/// Cached paper details plus polled AI score and translation jobs.
pub struct PaperStore {
    papers: PaperService,
    details: Arc<EntityCache<String, PaperDetail>>,
    ai_scores: AsyncTaskPoller<String, AiSummary>,
    translations: AsyncTaskPoller<TranslateRequest, TranslationResult>,
    detail_batch: BatchOrchestrator,
    score_batch: BatchOrchestrator,
}

impl PaperStore {
    /// Store over `papers` with the given poll interval and chunk sizes.
    pub fn new(papers: PaperService, poll_interval: Duration, batch: &BatchConfig) -> Self {
        let ai_scores = AsyncTaskPoller::new(
            Arc::new(EntityCache::new("ai_scores")),
            Arc::new(AiScoreJobs::new(papers.clone())),
            poll_interval,
        );
        let translations = AsyncTaskPoller::new(
            Arc::new(EntityCache::new("translations")),
            Arc::new(TranslationJobs::new(papers.clone())),
            poll_interval,
        );

        Self {
            papers,
            details: Arc::new(EntityCache::new("paper_details")),
            ai_scores,
            translations,
            detail_batch: BatchOrchestrator::new(batch.detail_chunk_size),
            score_batch: BatchOrchestrator::new(batch.score_chunk_size),
        }
    }

    // --- Paper details ---

    /// Cached detail, or a single shared fetch for concurrent callers.
    #[instrument(skip(self))]
    pub async fn get_paper_detail(&self, arxiv_id: &str) -> Result<PaperDetail> {
        let papers = &self.papers;
        self.details
            .get_or_fetch(arxiv_id.to_string(), |id| async move { papers.paper_detail(&id).await })
            .await
    }

    /// Cached detail, without fetching.
    pub fn peek_paper_detail(&self, arxiv_id: &str) -> Option<PaperDetail> {
        self.details.peek(&arxiv_id.to_string())
    }

    /// Insert a detail obtained elsewhere.
    pub fn put_paper_detail(&self, detail: PaperDetail) {
        self.details.put(detail.arxiv_id.clone(), detail);
    }

    /// Warm the detail cache for `ids`, a few requests at a time.
    #[instrument(skip_all, fields(requested = ids.len()))]
    pub async fn batch_get_paper_details(&self, ids: Vec<String>) -> BatchReport<String> {
        let details = &self.details;
        self.detail_batch
            .run(
                ids,
                |id| details.is_cached_or_loading(id),
                |id| self.get_paper_detail_owned(id),
            )
            .await
    }

    async fn get_paper_detail_owned(&self, arxiv_id: String) -> Result<PaperDetail> {
        self.get_paper_detail(&arxiv_id).await
    }

    // --- AI scores ---

    /// Cached score; otherwise waits for a running job, or starts one in the
    /// background and returns `None`.
    pub async fn get_ai_score(&self, arxiv_id: &str) -> Result<Option<AiSummary>> {
        self.ai_scores.get_or_start(arxiv_id.to_string()).await
    }

    /// Score of a paper, starting a job if needed and waiting for it.
    ///
    /// # Errors
    ///
    /// `ClientError::JobFailed` if the server reports the job as failed,
    /// `ClientError::Cancelled` if the cache is cleared while waiting.
    pub async fn fetch_ai_score(&self, arxiv_id: &str) -> Result<AiSummary> {
        self.ai_scores.fetch(arxiv_id.to_string()).await
    }

    /// Cached AI score, without fetching or starting a job.
    pub fn peek_ai_score(&self, arxiv_id: &str) -> Option<AiSummary> {
        self.ai_scores.cache().peek(&arxiv_id.to_string())
    }

    /// Start a scoring job unless one is cached or running.
    ///
    /// Returns `true` if a new job was created.
    pub async fn start_ai_score(&self, arxiv_id: &str) -> Result<bool> {
        self.ai_scores.start(arxiv_id.to_string()).await
    }

    /// `true` while an AI score job for `arxiv_id` is being polled.
    pub fn is_scoring(&self, arxiv_id: &str) -> bool {
        self.ai_scores.is_polling(&arxiv_id.to_string())
    }

    /// Start scoring jobs for every paper without a score. Does not wait for
    /// the jobs to finish.
    #[instrument(skip_all, fields(requested = ids.len()))]
    pub async fn batch_get_ai_scores(&self, ids: Vec<String>) -> BatchReport<String> {
        let cache = self.ai_scores.cache();
        self.score_batch
            .run(ids, |id| cache.is_cached_or_loading(id), |id| self.ai_scores.start(id))
            .await
    }

    // --- Translation ---

    /// Translate text through a server job and wait for the result.
    ///
    /// Identical requests share one job and the finished result is cached.
    pub async fn translate(&self, request: TranslateRequest) -> Result<TranslationResult> {
        self.translations.fetch(request).await
    }

    // --- Lifecycle ---

    /// Polling tasks currently running, scores and translations together.
    pub fn active_polls(&self) -> usize {
        self.ai_scores.active_tasks() + self.translations.active_tasks()
    }

    /// Drop every cached value and stop every polling task.
    pub fn clear_cache(&self) {
        self.details.clear();
        self.ai_scores.cache().clear();
        self.translations.cache().clear();
        info!("paper caches cleared");
    }
}

impl std::fmt::Debug for PaperStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperStore")
            .field("details", &self.details.len())
            .field("ai_scores", &self.ai_scores.cache().len())
            .field("active_polls", &self.active_polls())
            .finish()
    }
}
