use paperlens_domain::{ClientError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Strip the optional `{code, message, data}` wrapper.
///
/// An object carrying a `data` field yields that field (which may be null);
/// every other body is returned unchanged.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Decode an unwrapped payload into a typed value.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|err| ClientError::Decode(err.to_string()))
}
