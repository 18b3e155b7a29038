//! API data models

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::workout::{null_as_default, WorkoutPlan};

/// Image shown when the service has no picture for a creator or video
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

fn or_placeholder(url: Option<&str>) -> &str {
    match url {
        Some(u) if !u.trim().is_empty() => u,
        _ => PLACEHOLDER_IMAGE,
    }
}

/// Fitness creator (YouTube channel) known to the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub youtube_channel_id: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl Creator {
    /// Profile image URL, falling back to the placeholder image
    pub fn profile_image(&self) -> &str {
        or_placeholder(self.profile_image_url.as_deref())
    }
}

/// Extracted workout attached to a YouTube video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub youtube_video_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub workout_data: serde_json::Value,
    pub creator: Creator,
}

impl Workout {
    /// Thumbnail URL, falling back to the placeholder image
    pub fn thumbnail(&self) -> &str {
        or_placeholder(self.thumbnail_url.as_deref())
    }

    /// Typed view of `workout_data`
    pub fn plan(&self) -> crate::Result<WorkoutPlan> {
        WorkoutPlan::from_value(&self.workout_data)
    }
}

/// Lifecycle states reported for an extraction job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Fetching,
    AnalyzingWorkout,
    Complete,
    Failed,
    /// Any status this client does not know about yet
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Fetching => "FETCHING",
            JobStatus::AnalyzingWorkout => "ANALYZING_WORKOUT",
            JobStatus::Complete => "COMPLETE",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) => s,
        }
    }

    /// Whether polling should stop once this status is seen
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "PENDING" => JobStatus::Pending,
            "FETCHING" => JobStatus::Fetching,
            "ANALYZING_WORKOUT" => JobStatus::AnalyzingWorkout,
            "COMPLETE" => JobStatus::Complete,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobStatus::from(s.as_str()))
    }
}

/// Server-side extraction job as reported by the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionJob {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub youtube_video_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub result_video_id: Option<i64>,
    #[serde(default)]
    pub result_youtube_video_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Response to an extraction request
///
/// A fresh request queues a job; a video that was already extracted comes
/// straight back as its workout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtractionStart {
    Queued {
        #[serde(rename = "jobId")]
        job_id: String,
    },
    Existing(Box<Workout>),
}

impl ExtractionStart {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            ExtractionStart::Queued { job_id } => Some(job_id),
            ExtractionStart::Existing(_) => None,
        }
    }
}

/// Error body returned by the service on rejected requests
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_status_round_trips_wire_strings() {
        let status: JobStatus = serde_json::from_value(json!("ANALYZING_WORKOUT")).unwrap();
        assert_eq!(status, JobStatus::AnalyzingWorkout);
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("ANALYZING_WORKOUT"));

        let unknown: JobStatus = serde_json::from_value(json!("FETCHING_DATA")).unwrap();
        assert_eq!(unknown, JobStatus::Other("FETCHING_DATA".to_string()));
        assert_eq!(unknown.to_string(), "FETCHING_DATA");
    }

    #[test]
    fn test_only_complete_and_failed_are_terminal() {
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Fetching.is_terminal());
        assert!(!JobStatus::AnalyzingWorkout.is_terminal());
        assert!(!JobStatus::Other("QUEUED".to_string()).is_terminal());
    }

    #[test]
    fn test_extraction_job_deserializes_server_payload() {
        let job: ExtractionJob = serde_json::from_value(json!({
            "id": "5f2b8a3c-0000-4000-8000-000000000001",
            "youtubeVideoId": "dQw4w9WgXcQ",
            "status": "COMPLETE",
            "progress": 100,
            "resultVideoId": 42,
            "errorMessage": null
        }))
        .unwrap();

        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.progress, 100);
        assert_eq!(job.result_video_id, Some(42));
        assert_eq!(job.result_youtube_video_id, None);
        assert_eq!(job.error_message, None);
    }

    #[test]
    fn test_extraction_start_accepts_both_shapes() {
        let queued: ExtractionStart =
            serde_json::from_value(json!({ "jobId": "abc-123" })).unwrap();
        assert_eq!(queued.job_id(), Some("abc-123"));

        let existing: ExtractionStart = serde_json::from_value(json!({
            "id": 7,
            "youtubeVideoId": "dQw4w9WgXcQ",
            "title": "Full Body HIIT",
            "thumbnailUrl": null,
            "workoutData": { "exercises": [] },
            "creator": { "id": 1, "name": "Coach", "youtubeChannelId": "UC1", "profileImageUrl": null }
        }))
        .unwrap();

        match existing {
            ExtractionStart::Existing(workout) => {
                assert_eq!(workout.id, 7);
                assert_eq!(workout.thumbnail(), PLACEHOLDER_IMAGE);
                assert_eq!(workout.creator.profile_image(), PLACEHOLDER_IMAGE);
            }
            other => panic!("expected existing workout, got {:?}", other),
        }
    }

    #[test]
    fn test_null_text_fields_default_to_empty() {
        let workout: Workout = serde_json::from_value(json!({
            "id": 8,
            "youtubeVideoId": "dQw4w9WgXcQ",
            "title": null,
            "thumbnailUrl": null,
            "workoutData": null,
            "creator": { "id": 3, "name": null, "youtubeChannelId": null }
        }))
        .unwrap();
        assert_eq!(workout.title, "");
        assert_eq!(workout.creator.name, "");
        assert_eq!(workout.creator.youtube_channel_id, "");

        let start: ExtractionStart = serde_json::from_value(json!({
            "id": 8,
            "youtubeVideoId": "dQw4w9WgXcQ",
            "title": null,
            "creator": { "id": 3, "name": "Coach" }
        }))
        .unwrap();
        assert!(matches!(start, ExtractionStart::Existing(ref w) if w.id == 8));

        let job: ExtractionJob = serde_json::from_value(json!({
            "id": "job-1",
            "youtubeVideoId": null,
            "status": "PENDING"
        }))
        .unwrap();
        assert_eq!(job.youtube_video_id, "");
    }

    #[test]
    fn test_placeholder_only_replaces_missing_images() {
        let creator = Creator {
            id: 1,
            name: "Coach".to_string(),
            youtube_channel_id: "UC1".to_string(),
            profile_image_url: Some("https://img.example/coach.jpg".to_string()),
        };
        assert_eq!(creator.profile_image(), "https://img.example/coach.jpg");

        let blank = Creator {
            profile_image_url: Some("  ".to_string()),
            ..creator
        };
        assert_eq!(blank.profile_image(), PLACEHOLDER_IMAGE);
    }
}
