//! Paper and AI summary types

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

/// Paper as listed by `GET /papers/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub arxiv_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: String,
    #[serde(default)]
    pub updated: Option<String>,
    pub pdf_url: String,
    pub categories: Vec<String>,
    pub entry_id: String,
    /// List endpoints may already carry a computed summary
    #[serde(default)]
    pub ai_summary: Option<AiSummary>,
}

/// Full paper detail from `GET /papers/{id}`
///
/// Same shape as [`Paper`]; kept as a distinct name because the detail
/// endpoint is the one guaranteed to include `ai_summary` when available.
pub type PaperDetail = Paper;

/// Token accounting reported by the scoring model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub reasoning_length: Option<u64>,
    pub content_length: Option<u64>,
}

/// Reviewer recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "推荐")]
    Recommended,
    #[serde(rename = "强烈推荐")]
    StronglyRecommended,
    #[serde(untagged)]
    Other(String),
}

/// Per-dimension AI score breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiScoreDetail {
    /// 0-100
    pub total_score: Option<f64>,
    /// 0-30
    pub innovation_score: Option<f64>,
    /// 0-25
    pub technical_depth_score: Option<f64>,
    /// 0-20
    pub practical_value_score: Option<f64>,
    /// 0-15
    pub experiments_score: Option<f64>,
    /// 0-10
    pub writing_score: Option<f64>,
    pub summary: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub recommendation: Option<Recommendation>,
    pub reasoning: Option<String>,
    pub paper_id: Option<String>,
    pub api_model: Option<String>,
    pub api_request_id: Option<String>,
    pub api_created_timestamp: Option<i64>,
}

/// AI generated summary and score of a paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSummary {
    /// Overall score, 0-100
    pub score: Option<f64>,
    pub detail: Option<AiScoreDetail>,
    pub token_usage: Option<TokenUsage>,
}

/// Query parameters of `GET /papers/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperQuery {
    pub start_date: Option<String>,
    pub max_results: Option<u32>,
    pub category: Option<String>,
}

impl PaperQuery {
    /// Render as query pairs, applying the default and the server's limit
    /// to `max_results` and omitting unset/empty filters.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let max_results =
            self.max_results.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_RESULTS).min(MAX_RESULTS_LIMIT);

        let mut pairs = Vec::with_capacity(3);
        if let Some(start_date) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("start_date".to_string(), start_date.to_string()));
        }
        pairs.push(("max_results".to_string(), max_results.to_string()));
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("category".to_string(), category.to_string()));
        }
        pairs
    }
}

/// Payload of `GET /papers/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperListResponse {
    pub papers: Vec<Paper>,
    pub total: u64,
    pub date_range: String,
}
