//! API client for communicating with the studio backend.

mod catalog;
mod content;
mod envelope;
mod form;
mod materials;
mod tools;

pub use content::{EpisodeRef, ShotAsset};
pub use envelope::ResponseEnvelope;
pub use form::{FormPart, FormPayload};

use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response with the detail text provided by the backend
    #[error("HTTP {status} error: {detail}")]
    Http { status: u16, detail: String },
    /// Response body could not be interpreted
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for showing to the user verbatim.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(msg) | ApiError::Decode(msg) => msg,
            ApiError::Http { detail, .. } => detail,
        }
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(FormPayload),
}

/// Client for the studio REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    /// Optional auth token for Bearer authentication
    auth_token: Option<String>,
    envelope: ResponseEnvelope,
}

impl ApiClient {
    /// Create a new API client with the given API root (e.g. `http://host/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url.into()),
            client: reqwest::Client::new(),
            auth_token: None,
            envelope: ResponseEnvelope::default(),
        }
    }

    /// Create a client from configuration, applying timeout, auth and envelope settings.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base(config.base_url.clone()),
            client,
            auth_token: config.auth_token.clone(),
            envelope: config.envelope,
        })
    }

    /// Replace the auth token.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Replace the response envelope policy.
    pub fn with_envelope(mut self, envelope: ResponseEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn envelope(&self) -> ResponseEnvelope {
        self.envelope
    }

    /// Helper to add auth header to a request builder
    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.auth_token {
            builder.header("Authorization", format!("Bearer {}", token))
        } else {
            builder
        }
    }

    /// Absolute URL of an endpoint under the API root.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Issue a request and return the parsed JSON body.
    ///
    /// JSON bodies get an explicit `content-type`; multipart bodies have any
    /// caller-supplied `content-type` removed so the transport can write the
    /// boundary itself. Failures are logged before they are returned.
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        mut headers: HeaderMap,
        body: RequestBody,
    ) -> ApiResult<Value> {
        let url = self.url(endpoint);
        tracing::debug!("{} {}", method, url);

        let builder = self.with_auth(self.client.request(method.clone(), &url));
        let builder = match body {
            RequestBody::Empty => builder.headers(headers),
            RequestBody::Json(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let bytes = serde_json::to_vec(&value).map_err(|e| {
                    tracing::error!("Failed to serialize request body for {}: {}", url, e);
                    ApiError::Decode(e.to_string())
                })?;
                builder.headers(headers).body(bytes)
            }
            RequestBody::Multipart(form) => {
                headers.remove(CONTENT_TYPE);
                let form = form.into_form().map_err(|e| {
                    tracing::error!("Failed to build multipart body for {}: {}", url, e);
                    e
                })?;
                builder.headers(headers).multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Network error on {} {}: {}", method, url, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", url, e);
            ApiError::Network(e.to_string())
        })?;

        if !status.is_success() {
            let detail = error_detail(status, &text);
            tracing::error!("HTTP error {} on {} {}: {}", status.as_u16(), method, url, detail);
            return Err(ApiError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        parse_body(&text).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", url, e);
            e
        })
    }

    /// Issue a request and deserialize the response into `T`.
    pub(crate) async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: RequestBody,
    ) -> ApiResult<T> {
        let value = self
            .request(endpoint, method, HeaderMap::new(), body)
            .await?;
        decode(value, endpoint)
    }

    pub(crate) async fn get(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(endpoint, Method::GET, HeaderMap::new(), RequestBody::Empty)
            .await
    }

    pub(crate) async fn delete(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(endpoint, Method::DELETE, HeaderMap::new(), RequestBody::Empty)
            .await
    }

    pub(crate) async fn send_json(
        &self,
        endpoint: &str,
        method: Method,
        body: Value,
    ) -> ApiResult<Value> {
        self.request(endpoint, method, HeaderMap::new(), RequestBody::Json(body))
            .await
    }

    pub(crate) async fn send_form(
        &self,
        endpoint: &str,
        method: Method,
        form: FormPayload,
    ) -> ApiResult<Value> {
        self.request(endpoint, method, HeaderMap::new(), RequestBody::Multipart(form))
            .await
    }
}

/// Strip trailing slashes so endpoint joining never doubles them.
fn normalize_base(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Extract a human-readable failure detail from an error response body.
///
/// Priority: a `detail` field, then a `message` field, then the serialized
/// body. Bodies that are not JSON are returned as text; empty bodies fall
/// back to the status reason phrase.
pub(crate) fn error_detail(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            for key in ["detail", "message"] {
                match value.get(key) {
                    Some(Value::String(text)) => return text.clone(),
                    Some(Value::Null) | None => continue,
                    Some(other) => return other.to_string(),
                }
            }
            value.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

fn parse_body(text: &str) -> ApiResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value, context: &str) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!("Failed to decode response of {}: {}", context, e);
        ApiError::Decode(e.to_string())
    })
}
