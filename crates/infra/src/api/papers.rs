//! Paper catalog endpoints

use std::sync::Arc;

use paperlens_core::{decode, HttpClient, HttpMethod};
use paperlens_domain::constants::{
    ai_score_async_path, ai_score_task_path, paper_path, translate_task_path, PAPERS_PATH,
    TRANSLATE_ASYNC_PATH,
};
use paperlens_domain::{
    AiScoreTask, AiScoreTaskStatus, Paper, PaperDetail, PaperListResponse, PaperQuery, Result,
    TranslateRequest, TranslationTask, TranslationTaskStatus,
};
use tracing::{debug, instrument};

/// Typed access to the `/papers` endpoints.
#[derive(Debug, Clone)]
pub struct PaperService {
    http: Arc<HttpClient>,
}

impl PaperService {
    /// Service over a shared `HttpClient`.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List papers, `max_results` defaulting to 100.
    #[instrument(skip(self))]
    pub async fn list_papers(&self, query: &PaperQuery) -> Result<Vec<Paper>> {
        let response: PaperListResponse =
            self.http.get_with_query(PAPERS_PATH, &query.to_pairs()).await?;
        debug!(count = response.papers.len(), total = response.total, "papers listed");
        Ok(response.papers)
    }

    /// `GET /papers/{id}`.
    pub async fn paper_detail(&self, arxiv_id: &str) -> Result<PaperDetail> {
        self.http.get(&paper_path(arxiv_id)).await
    }

    /// Ask the server to score a paper. The job id is in the response.
    #[instrument(skip(self))]
    pub async fn start_ai_score(&self, arxiv_id: &str) -> Result<AiScoreTask> {
        let payload =
            self.http.call(HttpMethod::Post, &ai_score_async_path(arxiv_id), None, &[]).await?;
        decode(payload)
    }

    /// Status of an AI scoring job.
    pub async fn ai_score_task(&self, task_id: &str) -> Result<AiScoreTaskStatus> {
        self.http.get(&ai_score_task_path(task_id)).await
    }

    /// Start a translation job.
    #[instrument(skip(self, request), fields(chars = request.text.chars().count()))]
    pub async fn start_translation(&self, request: &TranslateRequest) -> Result<TranslationTask> {
        self.http.post(TRANSLATE_ASYNC_PATH, request).await
    }

    /// Status of a translation job.
    pub async fn translation_task(&self, task_id: &str) -> Result<TranslationTaskStatus> {
        self.http.get(&translate_task_path(task_id)).await
    }
}
