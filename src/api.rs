//! Project-key endpoint wrappers on [`WayGptClient`](crate::WayGptClient).
//!
//! Each submodule adds an `impl WayGptClient` block for one group of
//! endpoints. Paths are relative to the configured base URL.

pub mod catalog;
pub mod chat;
pub mod media;

pub const CHAT_COMPLETIONS_PATH: &str = "/api/v1/waygpt/chat/completions";
pub const IMAGE_GENERATIONS_PATH: &str = "/api/v1/waygpt/images/generations";
pub const VIDEO_GENERATIONS_PATH: &str = "/api/v1/waygpt/videos/generations";
pub const MEDIA_JOBS_PATH: &str = "/api/v1/waygpt/media/jobs";
pub const MODELS_PATH: &str = "/api/v1/waygpt/models";
pub const MODELS_FULL_PATH: &str = "/api/v1/waygpt/models/full";
pub const USE_CASES_PATH: &str = "/api/v1/waygpt/use-cases";
pub const WIDGET_TOKEN_PATH: &str = "/api/v1/widget/token";

/// Percent-encode a caller-supplied id for use as one path segment.
pub(crate) fn path_segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
