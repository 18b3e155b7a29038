//! API module for the workout extraction service
//!
//! Typed access to the external REST API: extraction jobs, workouts and the
//! creator catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod client;
pub mod models;

use models::{Creator, ExtractionJob, ExtractionStart, Workout};

/// Operations exposed by the external API, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiOperation {
    InitiateExtraction,
    ExtractionStatus,
    WorkoutDetails,
    WorkoutByYoutubeId,
    ExportPdf,
    Creators,
    Creator,
    CreatorVideos,
}

impl ApiOperation {
    /// Message attached to a rejected call of this operation
    pub fn failure_message(&self) -> &'static str {
        match self {
            ApiOperation::InitiateExtraction => "Failed to initiate extraction",
            ApiOperation::ExtractionStatus => "Failed to get extraction status",
            ApiOperation::WorkoutDetails | ApiOperation::WorkoutByYoutubeId => "Workout not found",
            ApiOperation::ExportPdf => "Failed to export workout PDF",
            ApiOperation::Creators => "Failed to fetch creators",
            ApiOperation::Creator => "Creator not found",
            ApiOperation::CreatorVideos => "Failed to fetch videos for creator",
        }
    }

    /// Message shown to the user when the operation backing a view fails
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiOperation::InitiateExtraction => "Failed to start extraction. Please check the URL and try again.",
            ApiOperation::ExtractionStatus => "Failed to get extraction status. Please try again.",
            ApiOperation::Creators => "Failed to load creators",
            other => other.failure_message(),
        }
    }
}

/// Client-side contract of the workout extraction API
#[async_trait]
pub trait WorkoutApi: Send + Sync {
    /// Submit a video URL; returns a new job or the already extracted workout
    async fn initiate_extraction(&self, url: &str) -> Result<ExtractionStart>;

    async fn get_extraction_status(&self, job_id: &str) -> Result<ExtractionJob>;

    /// Look up a workout by its numeric id
    async fn get_workout_details(&self, id: i64) -> Result<Workout>;

    async fn get_workout_by_youtube_id(&self, youtube_video_id: &str) -> Result<Workout>;

    /// Download the rendered PDF of a workout
    async fn export_workout_pdf(&self, youtube_video_id: &str) -> Result<Vec<u8>>;

    async fn get_creators(&self) -> Result<Vec<Creator>>;

    async fn get_creator_by_id(&self, id: i64) -> Result<Creator>;

    async fn get_videos_by_creator_id(&self, creator_id: i64) -> Result<Vec<Workout>>;
}
