//! Domain types and models
//!
//! Shapes mirror the catalog service's JSON schema so that payloads
//! deserialize without adapters.

pub mod api;
pub mod auth;
pub mod collection;
pub mod paper;
pub mod task;

pub use api::{ApiEnvelope, PaginatedResponse};
pub use auth::{RefreshTokenRequest, TokenPair, TokenResponse, UserCredentials, UserInfo, UserState, UserUpdate};
pub use collection::{
    CollectionCreate, CollectionDetail, CollectionInfo, CollectionPaperInfo, CollectionUpdate,
};
pub use paper::{
    AiScoreDetail, AiSummary, Paper, PaperDetail, PaperListResponse, PaperQuery, Recommendation,
    TokenUsage,
};
pub use task::{
    AiScoreTask, AiScoreTaskStatus, JobSnapshot, JobStatus, TranslateRequest, TranslationResult,
    TranslationTask, TranslationTaskStatus,
};
