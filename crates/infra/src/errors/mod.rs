//! Conversions from adapter-level errors into the client error type

mod conversions;

pub use conversions::InfraError;
