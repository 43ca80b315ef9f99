use std::time::Duration;

use async_trait::async_trait;
use paperlens_core::{ApiRequest, HttpMethod, RawResponse, Transport};
use paperlens_domain::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use paperlens_domain::{ApiConfig, ClientError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::InfraError;

/// [`Transport`] over a shared reqwest client.
///
/// Performs exactly one attempt per request. Every HTTP status is returned
/// as a [`RawResponse`]; only transport failures become errors.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Transport configured from the `api` section of the client config.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = Self::builder().base_url(&config.base_url).timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Base URL every request path is joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            return ClientError::Timeout(self.timeout);
        }
        InfraError::from(err).into()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.url_for(&request.path);
        let method = to_reqwest_method(request.method);
        debug!(%method, %url, authenticated = request.bearer.is_some(), "sending HTTP request");

        let mut builder = self.client.request(method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| self.map_send_error(err))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| self.map_send_error(err))?;
        debug!(%method, %url, status, bytes = bytes.len(), "received HTTP response");

        Ok(RawResponse::new(status, parse_body(&bytes)))
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl ReqwestTransportBuilder {
    /// Base URL for request paths.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Validate the base URL and build the reqwest client.
    pub fn build(self) -> Result<ReqwestTransport> {
        let parsed = Url::parse(&self.base_url).map_err(InfraError::from)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "unsupported base url scheme: {}",
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(extra) = self.default_headers {
            headers.extend(extra);
        }

        let mut builder =
            ReqwestClient::builder().timeout(self.timeout).default_headers(headers).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(InfraError::from)?;

        Ok(ReqwestTransport {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Empty bodies read as `null`, non-JSON bodies as a JSON string.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
