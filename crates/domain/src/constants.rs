//! Application constants
//!
//! Centralized location for API paths, storage keys and client defaults.

// Auth endpoints
/// Exchange credentials for a token pair.
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
/// Create an account.
pub const AUTH_REGISTER_PATH: &str = "/auth/register";
/// Exchange a refresh token for a new pair.
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";
/// Revoke a refresh token.
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";
/// Current user.
pub const AUTH_ME_PATH: &str = "/auth/me";

// Paper endpoints
/// Paper listing; detail lives under `/papers/{id}`.
pub const PAPERS_PATH: &str = "/papers/";
/// AI scoring job status, by task id.
pub const AI_SCORE_TASKS_PATH: &str = "/papers/ai-score/tasks";
/// Start a translation job.
pub const TRANSLATE_ASYNC_PATH: &str = "/papers/translate/async";
/// Translation job status, by task id.
pub const TRANSLATE_TASKS_PATH: &str = "/papers/translate/tasks";

// Collection endpoints
/// Collections root.
pub const COLLECTIONS_PATH: &str = "/collections";

// Persisted token keys
/// Persisted key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Persisted key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

// Client defaults
/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Job status polling interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Detail requests per batch chunk.
pub const DEFAULT_DETAIL_CHUNK_SIZE: usize = 5;
/// AI score jobs started per batch chunk.
pub const DEFAULT_SCORE_CHUNK_SIZE: usize = 10;
/// Papers per listing when no limit is given.
pub const DEFAULT_MAX_RESULTS: u32 = 100;
/// Upper bound accepted by the listing endpoint.
pub const MAX_RESULTS_LIMIT: u32 = 2000;
/// File name of the persisted token pair.
pub const DEFAULT_TOKEN_FILE: &str = "paperlens-tokens.json";

/// Path of a single paper resource.
pub fn paper_path(arxiv_id: &str) -> String {
    format!("{PAPERS_PATH}{arxiv_id}")
}

/// Path that starts an asynchronous AI scoring job for a paper.
pub fn ai_score_async_path(arxiv_id: &str) -> String {
    format!("{PAPERS_PATH}{arxiv_id}/ai-score/async")
}

/// Path of an AI scoring job.
pub fn ai_score_task_path(task_id: &str) -> String {
    format!("{AI_SCORE_TASKS_PATH}/{task_id}")
}

/// Path of a translation job.
pub fn translate_task_path(task_id: &str) -> String {
    format!("{TRANSLATE_TASKS_PATH}/{task_id}")
}

/// Path of a single collection.
pub fn collection_path(collection_id: i64) -> String {
    format!("{COLLECTIONS_PATH}/{collection_id}")
}

/// Path linking a paper to a collection.
pub fn collection_paper_path(collection_id: i64, arxiv_id: &str) -> String {
    format!("{COLLECTIONS_PATH}/{collection_id}/papers/{arxiv_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        assert_eq!(paper_path("2301.00001"), "/papers/2301.00001");
        assert_eq!(ai_score_async_path("2301.00001"), "/papers/2301.00001/ai-score/async");
        assert_eq!(ai_score_task_path("t-1"), "/papers/ai-score/tasks/t-1");
        assert_eq!(translate_task_path("t-2"), "/papers/translate/tasks/t-2");
        assert_eq!(collection_path(7), "/collections/7");
        assert_eq!(collection_paper_path(7, "2301.00001"), "/collections/7/papers/2301.00001");
    }
}
