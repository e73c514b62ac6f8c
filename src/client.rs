//! Project-key API client and error types.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::http::{
    decode_json, encode_json, HttpCore, NONCE_HEADER, PROJECT_KEY_HEADER, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use crate::management::ManagementClient;
use crate::options::{ClientConfig, ClientOptions};
use crate::sse::SSEResponseExt;
use crate::stream::ChatStream;

/// Errors raised while building a client. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("project key is required: pass it explicitly or set WAYGPT_PROJECT_KEY")]
    MissingProjectKey,

    #[error("project id is required when HMAC signing is enabled")]
    MissingProjectId,

    #[error("HMAC secret is required when HMAC signing is enabled")]
    MissingHmacSecret,

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Error returned by every API operation.
///
/// `status_code` is absent for failures that never produced an HTTP response
/// (network errors, undecodable bodies, invalid arguments). Callers branch on
/// the status code rather than on error subtypes.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    /// Parsed error body, when the server sent JSON
    pub payload: Option<Value>,
    network: bool,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>, payload: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status_code,
            payload,
            network: false,
        }
    }

    /// Transport-level failure: DNS, connect, timeout, body read.
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self {
            network: true,
            ..Self::new(format!("Network error: {err}"), None, None)
        }
    }

    /// Rejected before any request was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(message, None, None)
    }

    pub(crate) fn decode(err: serde_json::Error, body: &[u8]) -> Self {
        Self::new(
            format!("Failed to decode response: {err}"),
            None,
            Some(Value::String(String::from_utf8_lossy(body).into_owned())),
        )
    }

    /// Classify an error response.
    ///
    /// The message is taken from `detail`, then `message`, then the raw body,
    /// then `HTTP <code>`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body).ok();
        let message = payload
            .as_ref()
            .and_then(error_message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.to_string()))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Self::new(message, Some(status.as_u16()), payload)
    }

    pub fn is_network(&self) -> bool {
        self.network
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == Some(429)
    }

    /// Rate limiting, gateway/server failures and network errors.
    pub fn is_retryable(&self) -> bool {
        match self.status_code {
            Some(code) => crate::retry::RETRYABLE_STATUSES.contains(&code),
            None => self.is_network(),
        }
    }

    /// Malformed or rejected request (4xx other than 429).
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code, Some(code) if (400..500).contains(&code) && code != 429)
    }
}

fn error_message(payload: &Value) -> Option<String> {
    ["detail", "message"]
        .iter()
        .find_map(|field| match payload.get(field)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// Client for the project-key authenticated WayGPT API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
/// ```no_run
/// use waygpt::{ChatCompletionRequest, Message, WayGptClient};
/// use waygpt::options::ClientOptions;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WayGptClient::new(ClientOptions::new().with_project_key("sk_live_..."))?;
/// let response = client
///     .chat_completion(ChatCompletionRequest::new(vec![Message::user("Hello!")]))
///     .await?;
/// println!("{}", response["choices"][0]["message"]["content"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WayGptClient {
    config: Arc<ClientConfig>,
    core: HttpCore,
}

impl WayGptClient {
    /// Resolve options (falling back to the environment) and build a client.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        Self::from_config(options.resolve()?)
    }

    /// Build a client purely from `WAYGPT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientOptions::default())
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        let core = HttpCore::new(config.transport().clone())?;
        Ok(Self {
            config: Arc::new(config),
            core,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// JWT Client API sharing this client's connection pool.
    pub fn management(&self) -> ManagementClient {
        ManagementClient::from_core(self.core.clone())
    }

    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, query, body).await?;
        decode_json(response).await
    }

    pub(crate) async fn request_stream(&self, path: &str, body: &Value) -> Result<ChatStream, ApiError> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        Ok(ChatStream::from_data_lines(response.sse()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let body = encode_json(body)?;
        debug!(%method, path, signed = self.config.signing_enabled(), "dispatching request");

        self.core
            .send(&method, path, |request| {
                let request = self.authorize(request, &method, path, &body);
                let request = if query.is_empty() { request } else { request.query(query) };
                if body.is_empty() {
                    request
                } else {
                    request.body(body.clone())
                }
            })
            .await
    }

    /// Project-key headers, plus a fresh signature when signing is enabled.
    fn authorize(&self, request: RequestBuilder, method: &Method, path: &str, body: &Bytes) -> RequestBuilder {
        let request = request
            .header(CONTENT_TYPE, "application/json")
            .header(PROJECT_KEY_HEADER, self.config.project_key().expose_secret());

        match self.config.signing() {
            Some(key) => {
                let signed = key.signature_headers(method, path, body);
                request
                    .header(TIMESTAMP_HEADER, signed.timestamp.to_string())
                    .header(NONCE_HEADER, signed.nonce)
                    .header(SIGNATURE_HEADER, signed.signature)
            }
            None => request,
        }
    }
}
