//! HMAC-SHA256 request signing.
//!
//! The server recomputes the signature from the received request, so the
//! canonical string layout is fixed:
//!
//! ```text
//! POST
//! /api/v1/waygpt/chat/completions
//! sha256(body)=<hex digest of the exact body bytes>
//! timestamp=<unix seconds>
//! nonce=<hex>
//! project=<project id>
//! ```

use hmac::{Hmac, Mac};
use itertools::Itertools;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::borrow::Cow;

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a nonce.
pub const NONCE_BYTES: usize = 16;

/// Request body as seen by the signer.
#[derive(Debug, Clone, Copy)]
pub enum SigningBody<'a> {
    Empty,
    /// Compact JSON, keys in insertion order
    Json(&'a Value),
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl SigningBody<'_> {
    /// The exact bytes that go on the wire.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            SigningBody::Empty => Cow::Borrowed(&[]),
            SigningBody::Json(value) => Cow::Owned(value.to_string().into_bytes()),
            SigningBody::Text(text) => Cow::Borrowed(text.as_bytes()),
            SigningBody::Bytes(bytes) => Cow::Borrowed(bytes),
        }
    }
}

/// Per-request metadata covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequestContext<'a> {
    pub method: &'a Method,
    /// Request path without host or query string
    pub path: &'a str,
    pub body: &'a [u8],
    pub timestamp: i64,
    pub nonce: &'a str,
}

impl SignedRequestContext<'_> {
    pub fn canonical_string(&self, project_id: &str) -> String {
        [
            self.method.as_str().to_ascii_uppercase(),
            self.path.to_string(),
            format!("sha256(body)={}", body_hash(self.body)),
            format!("timestamp={}", self.timestamp),
            format!("nonce={}", self.nonce),
            format!("project={project_id}"),
        ]
        .into_iter()
        .join("\n")
    }
}

/// Lowercase hex SHA-256 of the body bytes.
pub fn body_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Sign a request. Deterministic for identical inputs.
pub fn sign(context: &SignedRequestContext<'_>, project_id: &str, secret: &str) -> String {
    let canonical = context.canonical_string(project_id);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Random hex nonce with [`NONCE_BYTES`] bytes of entropy.
pub fn generate_nonce() -> String {
    hex::encode(rand::random::<[u8; NONCE_BYTES]>())
}

pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Values for the `X-MB-Timestamp`, `X-MB-Nonce` and `X-MB-Signature` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub timestamp: i64,
    pub nonce: String,
    pub signature: String,
}

/// Project id and shared secret used to sign requests.
#[derive(Debug, Clone)]
pub struct SigningKey {
    project_id: String,
    secret: SecretString,
}

impl SigningKey {
    pub fn new(project_id: impl Into<String>, secret: SecretString) -> Self {
        Self {
            project_id: project_id.into(),
            secret,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn sign(&self, context: &SignedRequestContext<'_>) -> String {
        sign(context, &self.project_id, self.secret.expose_secret())
    }

    /// Sign with a fresh timestamp and nonce. Call once per attempt.
    pub fn signature_headers(&self, method: &Method, path: &str, body: &[u8]) -> SignatureHeaders {
        let timestamp = unix_timestamp();
        let nonce = generate_nonce();
        let signature = self.sign(&SignedRequestContext {
            method,
            path,
            body,
            timestamp,
            nonce: &nonce,
        });

        SignatureHeaders {
            timestamp,
            nonce,
            signature,
        }
    }
}
