//! Workout Extract - client for the YouTube workout extraction service
//!
//! Submits YouTube URLs for extraction, tracks extraction jobs until they
//! finish and reads back the structured workouts and creator catalog.

pub mod api;
pub mod catalog;
pub mod config;
pub mod poller;
pub mod render;
pub mod workout;
pub mod youtube;

// Re-export main types for easy access
pub use crate::api::client::HttpApiClient;
pub use crate::api::models::{Creator, ExtractionJob, ExtractionStart, JobStatus, Workout};
pub use crate::api::{ApiOperation, WorkoutApi};
pub use crate::catalog::{CreatorDetail, FeaturedCreator};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::poller::{JobPoller, PollOutcome, ProgressState, RedirectTarget};
pub use crate::workout::{Exercise, Transparency, WorkoutPlan};

/// Result type for workout extraction client operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error types for workout extraction client operations
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{} (HTTP {}){}", .operation.failure_message(), .status, detail_suffix(.detail))]
    Api {
        operation: ApiOperation,
        status: u16,
        detail: Option<String>,
    },

    #[error("Missing or empty url")]
    MissingUrl,

    #[error("Invalid YouTube URL: {0}")]
    InvalidYoutubeUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

impl ExtractError {
    /// Static message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::Api { operation, .. } => operation.user_message().to_string(),
            ExtractError::MissingUrl => "Missing or empty url".to_string(),
            ExtractError::InvalidYoutubeUrl(_) => "Invalid YouTube URL".to_string(),
            ExtractError::Configuration(msg) => format!("Configuration error: {}", msg),
            ExtractError::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            ExtractError::Http(_) => "Could not reach the workout service".to_string(),
            ExtractError::Json(_) => "Unexpected response from server".to_string(),
            ExtractError::Io(e) => format!("File error: {}", e),
            ExtractError::Url(_) => "Invalid API base URL".to_string(),
            ExtractError::Toml(_) => "Invalid configuration file".to_string(),
        }
    }

    /// HTTP status of a rejected API call, if this error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractError::Api { status, .. } => Some(*status),
            ExtractError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
