//! Use-case CRUD within a project.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::projects::project_path;
use super::ManagementClient;
use crate::api::path_segment;
use crate::client::ApiError;

/// What a use case does.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseKind {
    #[default]
    Chat,
    CatalogExtract,
    Multimodal,
    ImageGeneration,
    VideoGeneration,
    Multi,
}

/// A use case to create.
///
/// `config` holds the server-side preset (system prompt, model priority,
/// response format) and is sent only when set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewUseCase {
    pub key: String,
    pub name: String,
    pub kind: UseCaseKind,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl NewUseCase {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: UseCaseKind::default(),
            is_active: true,
            config: None,
        }
    }

    pub fn with_kind(mut self, kind: UseCaseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial use-case update. Only fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UseCaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<UseCaseKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UseCaseUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: UseCaseKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

fn use_cases_path(project_id: &str) -> String {
    format!("{}/use-cases", project_path(project_id))
}

fn use_case_path(project_id: &str, use_case_id: &str) -> String {
    format!("{}/{}", use_cases_path(project_id), path_segment(use_case_id))
}

/// Find a use case by id in a listing. Numeric ids compare by their decimal form.
fn find_use_case(use_cases: Vec<Value>, use_case_id: &str) -> Option<Value> {
    use_cases.into_iter().find(|uc| match uc.get("id") {
        Some(Value::String(id)) => id == use_case_id,
        Some(Value::Number(id)) => id.to_string() == use_case_id,
        _ => false,
    })
}

impl ManagementClient {
    pub async fn list_use_cases(&self, token: &str, project_id: &str) -> Result<Vec<Value>, ApiError> {
        self.fetch(Method::GET, &use_cases_path(project_id), token)
            .await
    }

    /// Look up one use case.
    ///
    /// There is no fetch-by-id endpoint, so this lists the project's use cases
    /// and scans them. A missing id yields a 404 [`ApiError`].
    pub async fn get_use_case(
        &self,
        token: &str,
        project_id: &str,
        use_case_id: &str,
    ) -> Result<Value, ApiError> {
        let use_cases = self.list_use_cases(token, project_id).await?;
        find_use_case(use_cases, use_case_id).ok_or_else(|| {
            ApiError::new(format!("Use case {use_case_id} not found"), Some(404), None)
        })
    }

    pub async fn create_use_case(
        &self,
        token: &str,
        project_id: &str,
        use_case: &NewUseCase,
    ) -> Result<Value, ApiError> {
        self.submit(Method::POST, &use_cases_path(project_id), token, use_case)
            .await
    }

    pub async fn update_use_case(
        &self,
        token: &str,
        project_id: &str,
        use_case_id: &str,
        update: &UseCaseUpdate,
    ) -> Result<Value, ApiError> {
        self.submit(Method::PUT, &use_case_path(project_id, use_case_id), token, update)
            .await
    }

    pub async fn delete_use_case(
        &self,
        token: &str,
        project_id: &str,
        use_case_id: &str,
    ) -> Result<Value, ApiError> {
        self.fetch(Method::DELETE, &use_case_path(project_id, use_case_id), token)
            .await
    }
}
