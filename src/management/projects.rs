//! Project CRUD.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

use super::{ManagementClient, PROJECTS_PATH};
use crate::api::path_segment;
use crate::client::ApiError;

/// Partial project update. Only fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmac_required: Option<bool>,
    /// Requests per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpm: Option<u32>,
    /// Requests per day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpd: Option<u32>,
}

impl ProjectUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_allowed_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_hmac_required(mut self, required: bool) -> Self {
        self.hmac_required = Some(required);
        self
    }

    pub fn with_rate_limits(mut self, per_minute: Option<u32>, per_day: Option<u32>) -> Self {
        self.rate_limit_rpm = per_minute;
        self.rate_limit_rpd = per_day;
        self
    }
}

pub(crate) fn project_path(project_id: &str) -> String {
    format!("{PROJECTS_PATH}/{}", path_segment(project_id))
}

impl ManagementClient {
    pub async fn list_projects(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        self.fetch(Method::GET, PROJECTS_PATH, token).await
    }

    /// Project details, including its settings.
    pub async fn get_project(&self, token: &str, project_id: &str) -> Result<Value, ApiError> {
        let path = format!("{}/settings", project_path(project_id));
        self.fetch(Method::GET, &path, token).await
    }

    pub async fn create_project(&self, token: &str, name: &str) -> Result<Value, ApiError> {
        self.submit(Method::POST, PROJECTS_PATH, token, &json!({ "name": name }))
            .await
    }

    pub async fn update_project(
        &self,
        token: &str,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Value, ApiError> {
        self.submit(Method::PUT, &project_path(project_id), token, update)
            .await
    }

    pub async fn delete_project(&self, token: &str, project_id: &str) -> Result<Value, ApiError> {
        self.fetch(Method::DELETE, &project_path(project_id), token)
            .await
    }
}
