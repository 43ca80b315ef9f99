//! Request pipeline: wire types, envelope unwrapping and the authenticated client

mod client;
mod envelope;
mod request;

pub use client::{HttpClient, TransportRefresher};
pub use envelope::{decode, unwrap_envelope};
pub use request::{ApiRequest, HttpMethod, RawResponse};
