//! Typed services over the catalog API
//!
//! Each service is a thin layer on the shared [`paperlens_core::HttpClient`]:
//! paths come from `paperlens_domain::constants`, payloads are decoded into
//! domain types, and every request goes through the refresh-on-401 pipeline.

pub mod auth;
pub mod collections;
pub mod jobs;
pub mod papers;

pub use auth::AuthService;
pub use collections::CollectionService;
pub use jobs::{AiScoreJobs, TranslationJobs};
pub use papers::PaperService;
