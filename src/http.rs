//! HTTP transport shared by the project-key and JWT request paths.
//!
//! This module owns the pooled `reqwest` client, the retry loop and the
//! classification of responses into values or [`ApiError`]s.

use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::{ApiError, ConfigError};
use crate::options::TransportConfig;
use crate::retry::RetryPolicy;

pub const PROJECT_KEY_HEADER: &str = "x-project-key";
pub const TIMESTAMP_HEADER: &str = "X-MB-Timestamp";
pub const NONCE_HEADER: &str = "X-MB-Nonce";
pub const SIGNATURE_HEADER: &str = "X-MB-Signature";

/// Build a configured HTTP client from transport settings.
///
/// The timeout bounds connecting and each read, not the whole exchange, so a
/// stream that keeps delivering chunks is never cut off.
///
/// # Example
/// ```ignore
/// let client = build_http_client(config.transport())?;
/// ```
pub fn build_http_client(transport: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(transport.timeout())
        .read_timeout(transport.timeout())
        .user_agent(transport.user_agent())
        .build()
}

/// Serialize a JSON body once; the same bytes are signed and sent.
pub(crate) fn encode_json<B>(body: Option<&B>) -> Result<Bytes, ApiError>
where
    B: Serialize + ?Sized,
{
    match body {
        Some(body) => serde_json::to_vec(body)
            .map(Bytes::from)
            .map_err(|e| ApiError::new(format!("Failed to encode request body: {e}"), None, None)),
        None => Ok(Bytes::new()),
    }
}

/// Pooled client plus transport settings. Cheap to clone.
#[derive(Debug, Clone)]
pub(crate) struct HttpCore {
    http: Client,
    transport: Arc<TransportConfig>,
}

impl HttpCore {
    pub(crate) fn new(transport: TransportConfig) -> Result<Self, ConfigError> {
        let http = build_http_client(&transport)?;
        Ok(Self {
            http,
            transport: Arc::new(transport),
        })
    }

    pub(crate) fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.transport.base_url(), path)
    }

    /// Send a request, retrying transient failures.
    ///
    /// `prepare` runs once per attempt so that per-attempt headers (signature
    /// timestamp and nonce) are regenerated. Returns the response only when its
    /// status is below 400.
    pub(crate) async fn send<F>(
        &self,
        method: &Method,
        path: &str,
        prepare: F,
    ) -> Result<Response, ApiError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let retry = self.transport.retry();
        let mut schedule = retry.schedule();
        let mut retries_done = 0;

        loop {
            debug!(%method, path, attempt = retries_done + 1, "sending request");
            let request = prepare(self.http.request(method.clone(), self.url(path)));
            let can_retry = retry.allows_retry(method, retries_done);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if can_retry && RetryPolicy::is_retryable_status(status) {
                        let delay = retry
                            .retry_after(response.headers())
                            .unwrap_or_else(|| schedule.next_delay());
                        warn!(
                            %method,
                            path,
                            status = status.as_u16(),
                            ?delay,
                            "retryable status, retrying"
                        );
                        drop(response);
                        tokio::time::sleep(delay).await;
                        retries_done += 1;
                        continue;
                    }
                    return check_status(response).await;
                }
                // Invalid header values and the like; no attempt can succeed
                Err(e) if e.is_builder() => {
                    return Err(ApiError::invalid_request(format!("Failed to build request: {e}")));
                }
                Err(e) if can_retry => {
                    let delay = schedule.next_delay();
                    warn!(%method, path, error = %e, ?delay, "transport error, retrying");
                    tokio::time::sleep(delay).await;
                    retries_done += 1;
                }
                Err(e) => return Err(ApiError::network(e)),
            }
        }
    }
}

/// Turn a status >= 400 into an [`ApiError`].
pub(crate) async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.as_u16() < 400 {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "request failed");
    Err(ApiError::from_response(status, &body))
}

/// Decode a successful response body as JSON.
///
/// An empty body decodes as JSON `null`.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::network)?;

    let result = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&bytes)
    };

    result.map_err(|e| ApiError::decode(e, &bytes))
}
