//! Login and access tokens.

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;

use super::ManagementClient;
use crate::client::ApiError;
use crate::http::decode_json;

pub const LOGIN_PATH: &str = "/api/v1/auth/login/access-token";

/// Lifetime assumed when the server does not report one.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// A bearer token obtained from [`ManagementClient::login`].
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    token_type: String,
    expires_in: u64,
    obtained_at: DateTime<Utc>,
    raw: Map<String, Value>,
}

impl AccessToken {
    /// Normalize a login response body.
    ///
    /// `access_token` is required. `token_type` defaults to `bearer` and
    /// `expires_in` to [`DEFAULT_TOKEN_TTL_SECS`].
    pub fn from_response(body: Value) -> Result<Self, ApiError> {
        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let Some(token) = token else {
            return Err(ApiError::new(
                "Login response did not include an access token",
                None,
                Some(body),
            ));
        };

        let token_type = body
            .get("token_type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOKEN_TYPE)
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let raw = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Self {
            token,
            token_type,
            expires_in,
            obtained_at: Utc::now(),
            raw,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime in seconds, counted from [`obtained_at`](Self::obtained_at).
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.obtained_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    /// All fields of the login response.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl ManagementClient {
    /// Exchange email and password for a bearer token.
    ///
    /// Credentials are sent form-encoded as `username` and `password`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let form = [("username", email), ("password", password)];
        let response = self
            .core()
            .send(&Method::POST, LOGIN_PATH, |request| request.form(&form))
            .await?;

        AccessToken::from_response(decode_json(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_defaults() {
        let token = AccessToken::from_response(json!({"access_token": "jwt-abc"})).unwrap();
        assert_eq!(token.token(), "jwt-abc");
        assert_eq!(token.token_type(), "bearer");
        assert_eq!(token.expires_in(), 3600);
        assert!(!token.is_expired());
        assert_eq!(token.raw()["access_token"], "jwt-abc");
    }

    #[test]
    fn test_server_values_are_kept() {
        let token = AccessToken::from_response(json!({
            "access_token": "jwt-abc",
            "token_type": "Bearer",
            "expires_in": 900,
            "user_id": 7
        }))
        .unwrap();
        assert_eq!(token.token_type(), "Bearer");
        assert_eq!(token.expires_in(), 900);
        assert_eq!(token.raw()["user_id"], 7);
        assert_eq!(
            (token.expires_at() - token.obtained_at()).num_seconds(),
            900
        );
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        let token =
            AccessToken::from_response(json!({"access_token": "jwt", "expires_in": 0})).unwrap();
        assert!(token.is_expired());
    }

    #[test]
    fn test_missing_access_token() {
        let err = AccessToken::from_response(json!({"detail": "ok?"})).unwrap_err();
        assert_eq!(err.status_code, None);
        assert_eq!(err.payload, Some(json!({"detail": "ok?"})));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::from_response(json!({"access_token": "jwt-secret"})).unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("jwt-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
