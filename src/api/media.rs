//! Image and video generation, and media job tracking.

use reqwest::Method;
use serde_json::Value;

use super::{path_segment, IMAGE_GENERATIONS_PATH, MEDIA_JOBS_PATH, VIDEO_GENERATIONS_PATH};
use crate::client::{ApiError, WayGptClient};
use crate::model::{ImageGenerationRequest, VideoGenerationRequest};

impl WayGptClient {
    /// Generate images. A blank prompt is rejected without a request.
    pub async fn image_generation(&self, request: ImageGenerationRequest) -> Result<Value, ApiError> {
        let body = request.into_body()?;
        self.request_json(Method::POST, IMAGE_GENERATIONS_PATH, &[], Some(&body))
            .await
    }

    /// Start a video generation. The response carries a media job id to poll
    /// with [`get_media_job`](Self::get_media_job).
    pub async fn video_generation(&self, request: VideoGenerationRequest) -> Result<Value, ApiError> {
        let body = request.into_body()?;
        self.request_json(Method::POST, VIDEO_GENERATIONS_PATH, &[], Some(&body))
            .await
    }

    pub async fn get_media_job(&self, job_id: &str) -> Result<Value, ApiError> {
        let path = format!("{MEDIA_JOBS_PATH}/{}", path_segment(job_id));
        self.request_json(Method::GET, &path, &[], None).await
    }

    pub async fn cancel_media_job(&self, job_id: &str) -> Result<Value, ApiError> {
        let path = format!("{MEDIA_JOBS_PATH}/{}/cancel", path_segment(job_id));
        self.request_json(Method::POST, &path, &[], None).await
    }
}
