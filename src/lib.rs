//! # waygpt - Rust client for the WayGPT API
//!
//! An async client for the WayGPT AI server: chat completions (blocking and
//! streamed), image and video generation, model and use-case listings, widget
//! tokens, and the JWT-authenticated management API for projects and use cases.
//!
//! ## Features
//! - Async-first, tokio compatible, backed by a pooled `reqwest` client
//! - Optional HMAC-SHA256 request signing
//! - Automatic retry with exponential backoff for 429/5xx and network errors
//! - Streaming via Server-Sent Events as a `futures::Stream`
//! - One uniform [`ApiError`] carrying message, status code and payload
//!
//! ## Architecture
//!
//! Two clients share one transport:
//!
//! 1. **[`WayGptClient`]** authenticates with a project key (`x-project-key`)
//!    and optionally signs every request.
//! 2. **[`ManagementClient`]** authenticates with a bearer JWT obtained from
//!    [`ManagementClient::login`] and needs no project key.
//!
//! Configuration is collected in [`ClientOptions`](options::ClientOptions) and
//! resolved once against the `WAYGPT_*` environment variables.
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use waygpt::options::ClientOptions;
//! use waygpt::{ChatCompletionRequest, Message, WayGptClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WayGptClient::new(
//!         ClientOptions::new()
//!             .with_project_key("sk_live_...")
//!             .with_max_retries(2),
//!     )?;
//!
//!     let request = ChatCompletionRequest::new(vec![Message::user("Hello!")])
//!         .with_use_case("support_chat");
//!
//!     let response = client.chat_completion(request.clone()).await?;
//!     println!("{}", response["choices"][0]["message"]["content"]);
//!
//!     let mut stream = client.chat_completion_stream(request).await?;
//!     while let Some(chunk) = stream.next().await {
//!         print!("{}", chunk?.content_delta().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod http;
pub mod management;
pub mod model;
pub mod options;
pub mod retry;
pub mod signing;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{ApiError, ConfigError, WayGptClient};
pub use management::{AccessToken, ManagementClient, NewUseCase, ProjectUpdate, UseCaseKind, UseCaseUpdate};
pub use model::{
    ChatCompletionRequest, ImageGenerationRequest, Message, Role, VideoGenerationRequest,
    WidgetTokenRequest,
};
pub use options::{ClientConfig, ClientOptions};
pub use retry::RetryPolicy;
pub use stream::{ChatChunk, ChatStream};
