//! # PaperLens Domain
//!
//! Data types and models shared by every PaperLens crate.
//!
//! This crate contains:
//! - Catalog data types (papers, AI summaries, collections, users)
//! - Token and async-job models
//! - The client error taxonomy and `Result` alias
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other PaperLens crates
//! - No I/O, only serde-friendly data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
