//! YouTube URL handling

use regex::Regex;
use std::sync::OnceLock;

use crate::{ExtractError, Result};

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Same rule as the service, including the unescaped `.` in `youtu.be`
        Regex::new(r"(?:v=|youtu.be/|embed/|v/|shorts/)([a-zA-Z0-9_-]{11})")
            .expect("video id pattern is valid")
    })
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("bare id pattern is valid"))
}

/// Extract the 11 character video id from a YouTube URL
///
/// Recognises `watch?v=`, `youtu.be/`, `embed/`, `v/` and `shorts/` forms,
/// the same set the extraction service accepts.
pub fn parse_video_id(url: &str) -> Option<String> {
    video_id_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Validate a URL before submitting it for extraction
pub fn validate_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ExtractError::MissingUrl);
    }
    parse_video_id(url).ok_or_else(|| ExtractError::InvalidYoutubeUrl(url.to_string()))
}

/// Accept either a YouTube URL or a bare video id
pub fn resolve_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_string());
    }
    validate_url(input)
}

/// Whether `input` has the shape of a bare 11 character video id
pub fn is_video_id(input: &str) -> bool {
    bare_id_pattern().is_match(input.trim())
}

/// How a workout was named on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutRef {
    /// Numeric workout id
    Id(i64),
    /// YouTube video id
    Video(String),
}

/// Classify a workout argument
///
/// Digits-only input is a numeric id unless it is exactly 11 characters
/// long, which is also a valid YouTube id.
pub fn parse_workout_ref(input: &str) -> Result<WorkoutRef> {
    let input = input.trim();
    if !is_video_id(input) {
        if let Ok(id) = input.parse::<i64>() {
            return Ok(WorkoutRef::Id(id));
        }
    }
    resolve_video_id(input).map(WorkoutRef::Video)
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
