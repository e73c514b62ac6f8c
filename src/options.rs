//! Client options, environment resolution and the immutable client configuration.
//!
//! Options are collected in a [`ClientOptions`] builder and resolved exactly once
//! into a [`ClientConfig`]. Anything left unset falls back to the `WAYGPT_*`
//! environment variables, then to built-in defaults.

use reqwest::header::HeaderValue;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::client::ConfigError;
use crate::retry::RetryPolicy;
use crate::signing::SigningKey;

/// Default API server.
pub const DEFAULT_BASE_URL: &str = "https://app.waygpt.ru";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_URL: &str = "WAYGPT_API_URL";
pub const ENV_PROJECT_KEY: &str = "WAYGPT_PROJECT_KEY";
pub const ENV_PROJECT_ID: &str = "WAYGPT_PROJECT_ID";
pub const ENV_HMAC_SECRET: &str = "WAYGPT_HMAC_SECRET";
pub const ENV_USE_HMAC: &str = "WAYGPT_USE_HMAC";
pub const ENV_TIMEOUT_SECS: &str = "WAYGPT_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "WAYGPT_MAX_RETRIES";

const DEFAULT_USER_AGENT: &str = concat!("waygpt-rust/", env!("CARGO_PKG_VERSION"));

/// Builder for client construction.
///
/// Every field is optional; see [`ClientOptions::resolve`] for the fallback rules.
///
/// # Example
/// ```rust
/// use waygpt::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new()
///     .with_base_url("https://app.waygpt.ru")
///     .with_project_key("sk_live_...")
///     .with_timeout(Duration::from_secs(30))
///     .with_max_retries(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API server URL
    pub base_url: Option<String>,

    /// Project key sent as `x-project-key`
    pub project_key: Option<SecretString>,

    /// Project id, required for HMAC signing
    pub project_id: Option<String>,

    /// Shared HMAC secret, required for HMAC signing
    pub hmac_secret: Option<SecretString>,

    /// Enable HMAC request signing
    pub use_hmac: Option<bool>,

    /// Per-request timeout
    pub timeout: Option<Duration>,

    /// Maximum number of retries for retryable failures
    pub max_retries: Option<u32>,

    /// Backoff schedule for retries
    pub retry_policy: Option<RetryPolicy>,

    /// `User-Agent` header value
    pub user_agent: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API server URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the project key.
    pub fn with_project_key(mut self, project_key: impl Into<String>) -> Self {
        self.project_key = Some(SecretString::from(project_key.into()));
        self
    }

    /// Set the project id used in request signatures.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the shared HMAC secret.
    pub fn with_hmac_secret(mut self, secret: impl Into<String>) -> Self {
        self.hmac_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Enable or disable HMAC request signing.
    pub fn with_signing(mut self, enabled: bool) -> Self {
        self.use_hmac = Some(enabled);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the retry backoff schedule.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Override the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ClientConfig, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    ///
    /// Explicit options win over looked-up values. Fails if the project key is
    /// blank, or if signing is enabled without both a project id and a secret.
    pub fn resolve_with<F>(self, lookup: F) -> Result<ClientConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = self.transport_with(&lookup)?;

        let project_key = self
            .project_key
            .or_else(|| lookup(ENV_PROJECT_KEY).map(SecretString::from))
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(ConfigError::MissingProjectKey)?;
        if HeaderValue::from_str(project_key.expose_secret()).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "project_key",
                reason: "contains characters not allowed in an HTTP header".into(),
            });
        }

        let project_id = non_blank(self.project_id.or_else(|| lookup(ENV_PROJECT_ID)));
        let hmac_secret = self
            .hmac_secret
            .or_else(|| lookup(ENV_HMAC_SECRET).map(SecretString::from))
            .filter(|secret| !secret.expose_secret().is_empty());

        let use_hmac = match self.use_hmac {
            Some(enabled) => enabled,
            None => lookup(ENV_USE_HMAC).is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        };

        let signing = if use_hmac {
            let project_id = project_id.clone().ok_or(ConfigError::MissingProjectId)?;
            let secret = hmac_secret.ok_or(ConfigError::MissingHmacSecret)?;
            Some(SigningKey::new(project_id, secret))
        } else {
            None
        };

        Ok(ClientConfig {
            transport,
            project_key,
            project_id,
            signing,
        })
    }

    /// Resolve only the transport settings, against the process environment.
    ///
    /// Used by clients that do not authenticate with a project key.
    pub fn resolve_transport(&self) -> Result<TransportConfig, ConfigError> {
        self.transport_with(&|name: &str| std::env::var(name).ok())
    }

    pub(crate) fn transport_with<F>(&self, lookup: &F) -> Result<TransportConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = non_blank(self.base_url.clone().or_else(|| lookup(ENV_API_URL)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = raw_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => parse_var::<u64, _>(lookup, ENV_TIMEOUT_SECS)?
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        let mut retry = self.retry_policy.unwrap_or_default();
        retry.max_retries = match (self.max_retries, self.retry_policy) {
            (Some(max_retries), _) => max_retries,
            (None, Some(policy)) => policy.max_retries,
            (None, None) => parse_var::<u32, _>(lookup, ENV_MAX_RETRIES)?
                .unwrap_or(RetryPolicy::DEFAULT_MAX_RETRIES),
        };

        Ok(TransportConfig {
            base_url,
            timeout,
            retry,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

/// Transport settings shared by every request path.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
}

impl TransportConfig {
    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Fully resolved, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    transport: TransportConfig,
    project_key: SecretString,
    project_id: Option<String>,
    signing: Option<SigningKey>,
}

impl ClientConfig {
    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn project_key(&self) -> &SecretString {
        &self.project_key
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Signing credentials, present only when HMAC signing is enabled.
    pub fn signing(&self) -> Option<&SigningKey> {
        self.signing.as_ref()
    }

    pub fn signing_enabled(&self) -> bool {
        self.signing.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    pub fn max_retries(&self) -> u32 {
        self.transport.retry().max_retries
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup(name)) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                name,
                reason: format!("{raw:?}: {e}"),
            }),
        None => Ok(None),
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
        name: "base_url",
        reason: format!("{base_url:?}: {e}"),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidValue {
            name: "base_url",
            reason: format!("unsupported scheme {scheme:?}"),
        }),
    }
}
