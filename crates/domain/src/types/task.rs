//! Server-side asynchronous job types (AI scoring, translation)

use serde::{Deserialize, Serialize};

use super::paper::AiSummary;
use crate::impl_domain_status_conversions;

/// Lifecycle status of a server-side job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl_domain_status_conversions!(JobStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

impl JobStatus {
    /// `completed` and `failed` admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Job status normalized across job kinds, as consumed by the poller.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot<V> {
    pub status: JobStatus,
    pub result: Option<V>,
    pub error: Option<String>,
}

impl<V> JobSnapshot<V> {
    /// Still queued or running.
    pub fn pending() -> Self {
        Self { status: JobStatus::Pending, result: None, error: None }
    }

    /// Finished with `result`.
    pub fn completed(result: V) -> Self {
        Self { status: JobStatus::Completed, result: Some(result), error: None }
    }

    /// Failed with a server-reported reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self { status: JobStatus::Failed, result: None, error: Some(error.into()) }
    }
}

/// Response of `POST /papers/{id}/ai-score/async`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScoreTask {
    pub task_id: String,
    pub arxiv_id: String,
}

/// Response of `GET /papers/ai-score/tasks/{taskId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScoreTaskStatus {
    pub task_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<AiSummary>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<AiScoreTaskStatus> for JobSnapshot<AiSummary> {
    fn from(status: AiScoreTaskStatus) -> Self {
        Self { status: status.status, result: status.result, error: status.error }
    }
}

/// Body of `POST /papers/translate/async`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

impl TranslateRequest {
    /// Translate `text` into the server's default language.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), target_language: None }
    }

    /// Request a specific target language.
    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }
}

/// Response of `POST /papers/translate/async`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTask {
    pub task_id: String,
}

/// Finished translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(alias = "translation")]
    pub translated_text: String,
    #[serde(default)]
    pub target_language: Option<String>,
}

/// Response of `GET /papers/translate/tasks/{taskId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTaskStatus {
    pub task_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<TranslationResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<TranslationTaskStatus> for JobSnapshot<TranslationResult> {
    fn from(status: TranslationTaskStatus) -> Self {
        Self { status: status.status, result: status.result, error: status.error }
    }
}
