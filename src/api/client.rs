//! reqwest implementation of the workout extraction API

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::models::{Creator, ErrorBody, ExtractionJob, ExtractionStart, Workout};
use super::{ApiOperation, WorkoutApi};
use crate::config::ApiConfig;
use crate::{ExtractError, Result};

/// HTTP client for the workout extraction service
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExtractError::Configuration(format!(
                "API base URL must be http or https: {}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from already encoded path segments
    fn endpoint(&self, segments: &[&str]) -> String {
        format!("{}/{}", self.base_url, segments.join("/"))
    }

    async fn check(&self, operation: ApiOperation, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &text);
        warn!(
            "{:?} rejected with {}: {}",
            operation,
            status,
            detail.as_deref().unwrap_or("<no body>")
        );

        Err(ExtractError::Api {
            operation,
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: ApiOperation, url: String) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let response = self.check(operation, response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull a human-readable reason out of an error response body
fn error_detail(status: StatusCode, body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().map(str::to_string);
    }

    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(ErrorBody { error: Some(message) }) => Some(message),
        Ok(ErrorBody { error: None }) => status.canonical_reason().map(str::to_string),
        // Some endpoints answer with a bare string body
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl WorkoutApi for HttpApiClient {
    async fn initiate_extraction(&self, url: &str) -> Result<ExtractionStart> {
        let endpoint = self.endpoint(&["workouts", "extract"]);
        debug!("POST {} url={}", endpoint, url);

        let response = self
            .client
            .post(&endpoint)
            .json(&ExtractRequest { url })
            .send()
            .await?;
        let response = self.check(ApiOperation::InitiateExtraction, response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_extraction_status(&self, job_id: &str) -> Result<ExtractionJob> {
        let job_id = urlencoding::encode(job_id);
        let url = self.endpoint(&["workouts", "extract", "status", &*job_id]);
        self.get_json(ApiOperation::ExtractionStatus, url).await
    }

    async fn get_workout_details(&self, id: i64) -> Result<Workout> {
        let id = id.to_string();
        let url = self.endpoint(&["workouts", id.as_str()]);
        self.get_json(ApiOperation::WorkoutDetails, url).await
    }

    async fn get_workout_by_youtube_id(&self, youtube_video_id: &str) -> Result<Workout> {
        let video_id = urlencoding::encode(youtube_video_id);
        let url = self.endpoint(&["workouts", "youtube", &*video_id]);
        self.get_json(ApiOperation::WorkoutByYoutubeId, url).await
    }

    async fn export_workout_pdf(&self, youtube_video_id: &str) -> Result<Vec<u8>> {
        let video_id = urlencoding::encode(youtube_video_id);
        let url = self.endpoint(&["workouts", &*video_id, "export-pdf"]);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = self.check(ApiOperation::ExportPdf, response).await?;
        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes of PDF", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn get_creators(&self) -> Result<Vec<Creator>> {
        let url = self.endpoint(&["creators"]);
        self.get_json(ApiOperation::Creators, url).await
    }

    async fn get_creator_by_id(&self, id: i64) -> Result<Creator> {
        let id = id.to_string();
        let url = self.endpoint(&["creators", id.as_str()]);
        self.get_json(ApiOperation::Creator, url).await
    }

    async fn get_videos_by_creator_id(&self, creator_id: i64) -> Result<Vec<Workout>> {
        let id = creator_id.to_string();
        let url = self.endpoint(&["creators", id.as_str(), "videos"]);
        self.get_json(ApiOperation::CreatorVideos, url).await
    }
}
