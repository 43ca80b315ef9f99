//! Server-side jobs exposed to the poller

use async_trait::async_trait;
use paperlens_core::JobSource;
use paperlens_domain::{
    AiSummary, JobSnapshot, Result, TranslateRequest, TranslationResult,
};

use super::papers::PaperService;

/// AI scoring jobs, keyed by arXiv id
#[derive(Debug, Clone)]
pub struct AiScoreJobs {
    papers: PaperService,
}

impl AiScoreJobs {
    /// Jobs started through `papers`.
    pub fn new(papers: PaperService) -> Self {
        Self { papers }
    }
}

#[async_trait]
impl JobSource<String, AiSummary> for AiScoreJobs {
    async fn start_job(&self, arxiv_id: &String) -> Result<String> {
        Ok(self.papers.start_ai_score(arxiv_id).await?.task_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot<AiSummary>> {
        Ok(self.papers.ai_score_task(job_id).await?.into())
    }
}

/// Translation jobs, keyed by the request itself
#[derive(Debug, Clone)]
pub struct TranslationJobs {
    papers: PaperService,
}

impl TranslationJobs {
    /// Jobs started through `papers`.
    pub fn new(papers: PaperService) -> Self {
        Self { papers }
    }
}

#[async_trait]
impl JobSource<TranslateRequest, TranslationResult> for TranslationJobs {
    async fn start_job(&self, request: &TranslateRequest) -> Result<String> {
        Ok(self.papers.start_translation(request).await?.task_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot<TranslationResult>> {
        Ok(self.papers.translation_task(job_id).await?.into())
    }
}
