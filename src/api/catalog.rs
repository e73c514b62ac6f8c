//! Models, use cases and widget tokens.

use reqwest::Method;
use serde_json::Value;

use super::{MODELS_FULL_PATH, MODELS_PATH, USE_CASES_PATH, WIDGET_TOKEN_PATH};
use crate::client::{ApiError, WayGptClient};
use crate::model::WidgetTokenRequest;

impl WayGptClient {
    /// Ids of the models available to this project.
    pub async fn models(&self) -> Result<Vec<String>, ApiError> {
        self.request_json(Method::GET, MODELS_PATH, &[], None).await
    }

    /// Full model descriptors.
    pub async fn models_full(&self) -> Result<Vec<Value>, ApiError> {
        self.request_json(Method::GET, MODELS_FULL_PATH, &[], None).await
    }

    /// Use cases configured for this project.
    ///
    /// With `detailed`, the server includes each use case's configuration.
    /// The query string is not part of the signed path.
    pub async fn use_cases(&self, detailed: bool) -> Result<Vec<Value>, ApiError> {
        let query: &[(&str, &str)] = if detailed { &[("detailed", "true")] } else { &[] };
        self.request_json(Method::GET, USE_CASES_PATH, query, None).await
    }

    /// Issue a short-lived token for the embeddable browser widget.
    pub async fn create_widget_token(&self, request: WidgetTokenRequest) -> Result<Value, ApiError> {
        let body = serde_json::to_value(&request)
            .map_err(|e| ApiError::invalid_request(format!("Failed to encode request body: {e}")))?;
        self.request_json(Method::POST, WIDGET_TOKEN_PATH, &[], Some(&body))
            .await
    }
}
