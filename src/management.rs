//! JWT-authenticated Client API: login, projects and use cases.
//!
//! This path is independent of the project key. Requests carry
//! `Authorization: Bearer <token>` and share the transport, retry policy and
//! error classification with [`WayGptClient`](crate::WayGptClient).
//!
//! # Example
//! ```no_run
//! use waygpt::ManagementClient;
//! use waygpt::options::ClientOptions;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ManagementClient::new(ClientOptions::new().with_base_url("https://app.waygpt.ru"))?;
//! let token = client.login("user@example.com", "password").await?;
//! for project in client.list_projects(token.token()).await? {
//!     println!("{}", project["name"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod projects;
pub mod use_cases;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiError, ConfigError};
use crate::http::{decode_json, encode_json, HttpCore};
use crate::options::ClientOptions;

pub use auth::AccessToken;
pub use projects::ProjectUpdate;
pub use use_cases::{NewUseCase, UseCaseKind, UseCaseUpdate};

pub const PROJECTS_PATH: &str = "/api/v1/client/projects";

/// Client for the JWT-authenticated management API.
///
/// Every call takes the bearer token explicitly; tokens are not cached.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    core: HttpCore,
}

impl ManagementClient {
    /// Build from options. Only transport settings are used, so no project
    /// key is required.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        let transport = options.resolve_transport()?;
        Ok(Self::from_core(HttpCore::new(transport)?))
    }

    /// Build from `WAYGPT_API_URL` and the other transport variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientOptions::default())
    }

    pub(crate) fn from_core(core: HttpCore) -> Self {
        Self { core }
    }

    pub fn base_url(&self) -> &str {
        self.core.transport().base_url()
    }

    pub(crate) fn core(&self) -> &HttpCore {
        &self.core
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.dispatch(method, path, token, Bytes::new()).await
    }

    async fn submit<T, B>(&self, method: Method, path: &str, token: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_json(Some(body))?;
        self.dispatch(method, path, token, body).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Bytes,
    ) -> Result<T, ApiError> {
        let response = self
            .core
            .send(&method, path, |request| {
                let request = request
                    .header(CONTENT_TYPE, "application/json")
                    .bearer_auth(token);
                if body.is_empty() {
                    request
                } else {
                    request.body(body.clone())
                }
            })
            .await?;

        decode_json(response).await
    }
}
