//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use paperlens_domain::ClientError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ClientError);

impl From<InfraError> for ClientError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClientError> for InfraError {
    fn from(value: ClientError) -> Self {
        InfraError(value)
    }
}

/// Make the mapping explicit at call sites that need a `ClientError` directly.
pub(crate) trait IntoClientError {
    fn into_client_error(self) -> ClientError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ClientError */
/* -------------------------------------------------------------------------- */

impl IntoClientError for HttpError {
    fn into_client_error(self) -> ClientError {
        if self.is_timeout() {
            // The transport knows the configured limit and maps timeouts itself.
            return ClientError::Timeout(Duration::ZERO);
        }
        if self.is_builder() {
            return ClientError::Config(format!("invalid request: {self}"));
        }
        if self.is_decode() {
            return ClientError::Decode(format!("response body: {self}"));
        }
        let url = self.url().map(|u| u.to_string()).unwrap_or_default();
        if self.is_connect() {
            return ClientError::Network(format!("http connect error to {url}: {self}"));
        }
        ClientError::Network(format!("http request error to {url}: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        InfraError(err.into_client_error())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ClientError */
/* -------------------------------------------------------------------------- */

impl IntoClientError for std::io::Error {
    fn into_client_error(self) -> ClientError {
        ClientError::Storage(format!("io error ({:?}): {self}", self.kind()))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        InfraError(err.into_client_error())
    }
}

/* -------------------------------------------------------------------------- */
/* toml / url parse errors → ClientError */
/* -------------------------------------------------------------------------- */

impl IntoClientError for toml::de::Error {
    fn into_client_error(self) -> ClientError {
        ClientError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(err: toml::de::Error) -> Self {
        InfraError(err.into_client_error())
    }
}

impl IntoClientError for url::ParseError {
    fn into_client_error(self) -> ClientError {
        ClientError::Config(format!("invalid base url: {self}"))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(err: url::ParseError) -> Self {
        InfraError(err.into_client_error())
    }
}
