//! HTTP transport backed by reqwest

mod transport;

pub use transport::{ReqwestTransport, ReqwestTransportBuilder};
