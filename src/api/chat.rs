//! Chat completions, blocking and streamed.

use reqwest::Method;
use serde_json::Value;

use super::CHAT_COMPLETIONS_PATH;
use crate::client::{ApiError, WayGptClient};
use crate::model::ChatCompletionRequest;
use crate::stream::ChatStream;

impl WayGptClient {
    /// Run a chat completion and return the raw response JSON.
    pub async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<Value, ApiError> {
        let body = request.into_body(false);
        self.request_json(Method::POST, CHAT_COMPLETIONS_PATH, &[], Some(&body))
            .await
    }

    /// Run a streamed chat completion.
    ///
    /// Errors with a status >= 400 are returned before any chunk is read.
    ///
    /// # Example
    /// ```no_run
    /// use futures::StreamExt;
    /// use waygpt::{ChatCompletionRequest, Message, WayGptClient};
    ///
    /// # async fn run(client: WayGptClient) -> Result<(), waygpt::ApiError> {
    /// let mut stream = client
    ///     .chat_completion_stream(ChatCompletionRequest::new(vec![Message::user("Hi")]))
    ///     .await?;
    /// while let Some(chunk) = stream.next().await {
    ///     if let Some(text) = chunk?.content_delta() {
    ///         print!("{text}");
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatStream, ApiError> {
        let body = request.into_body(true);
        self.request_stream(CHAT_COMPLETIONS_PATH, &body).await
    }
}
