//! Client-side caches over the catalog services

pub mod paper_store;

pub use paper_store::PaperStore;
