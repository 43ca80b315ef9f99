//! # PaperLens Infrastructure
//!
//! Adapters and services over the `paperlens-core` ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - File-backed token persistence
//! - Typed services for the auth, paper and collection endpoints
//! - The paper store (detail cache, AI score and translation polling)
//! - Configuration loading and tracing initialisation
//! - [`PaperLensClient`], which wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `paperlens-core`
//! - Depends on `paperlens-domain` and `paperlens-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;
pub mod store;

// Re-export commonly used items
pub use api::{AuthService, CollectionService, PaperService};
pub use client::PaperLensClient;
pub use errors::InfraError;
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
pub use observability::init_tracing;
pub use storage::FileTokenStorage;
pub use store::PaperStore;
