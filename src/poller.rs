//! Extraction job polling
//!
//! Polls the status endpoint at a fixed interval, maps each reported status to
//! a display state and stops once the job reaches COMPLETE or FAILED.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::models::{ExtractionJob, JobStatus};
use crate::api::WorkoutApi;
use crate::config::PollingConfig;
use crate::ExtractError;

/// Message used when a job fails without saying why
pub const DEFAULT_FAILURE_MESSAGE: &str = "Extraction failed. Please try again.";

/// Message used when the status endpoint itself cannot be reached
pub const STATUS_ERROR_MESSAGE: &str = "Failed to get extraction status. Please try again.";

/// Display state derived from one status response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressState {
    /// Normalised status key; unknown statuses collapse to PROCESSING
    pub status: String,
    pub progress: u8,
    pub message: &'static str,
    pub observed_at: DateTime<Utc>,
}

impl ProgressState {
    pub fn label(&self) -> String {
        format_status(&self.status)
    }

    pub fn description(&self) -> &'static str {
        stage_description(&self.status)
    }
}

/// Map a job to its display state using the fixed five-state table
pub fn progress_state(job: &ExtractionJob) -> ProgressState {
    let (status, progress, message) = match &job.status {
        JobStatus::Pending => ("PENDING", 0, "Initializing extraction..."),
        JobStatus::Fetching => ("FETCHING", 10, "Downloading video data..."),
        JobStatus::AnalyzingWorkout => ("ANALYZING_WORKOUT", 75, "Analyzing workout content..."),
        JobStatus::Complete => ("COMPLETE", 100, "Extraction complete!"),
        JobStatus::Failed => ("FAILED", 0, "Extraction failed"),
        JobStatus::Other(_) => ("PROCESSING", job.progress.min(100), "Processing..."),
    };

    ProgressState {
        status: status.to_string(),
        progress,
        message,
        observed_at: Utc::now(),
    }
}

/// Human-readable status label, e.g. `ANALYZING_WORKOUT` -> `ANALYZING WORKOUT`
pub fn format_status(status: &str) -> String {
    status.replace('_', " ")
}

/// Longer explanation of what the service is doing in a given state
pub fn stage_description(status: &str) -> &'static str {
    match status {
        "PENDING" => "Setting up the extraction process...",
        "FETCHING" => "Downloading video metadata and transcript...",
        "ANALYZING_WORKOUT" => "Using AI to extract exercises, sets, and reps...",
        "COMPLETE" => "Your workout is ready!",
        "FAILED" => "Something went wrong during extraction",
        _ => "Processing...",
    }
}

/// Where to go once a job has completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RedirectTarget {
    /// Workout addressed by its YouTube video id
    YoutubeVideo(String),
    /// Workout addressed by its numeric id
    Workout(i64),
}

impl RedirectTarget {
    /// Prefer the result's YouTube id, then the job's own video id, then the
    /// numeric result id
    pub fn from_job(job: &ExtractionJob) -> Option<Self> {
        let non_blank = |s: &str| !s.trim().is_empty();

        job.result_youtube_video_id
            .as_deref()
            .filter(|s| non_blank(s))
            .or_else(|| Some(job.youtube_video_id.as_str()).filter(|s| non_blank(s)))
            .map(|id| RedirectTarget::YoutubeVideo(id.to_string()))
            .or_else(|| job.result_video_id.map(RedirectTarget::Workout))
    }
}

/// How a polling session ended
#[derive(Debug)]
pub enum PollOutcome {
    Completed {
        job: ExtractionJob,
        target: RedirectTarget,
    },
    Failed {
        job: ExtractionJob,
        message: String,
    },
    /// The status request failed; polling does not retry
    Errored {
        message: &'static str,
        source: ExtractError,
    },
    GaveUp {
        attempts: u32,
        last: Option<ExtractionJob>,
    },
    Cancelled {
        attempts: u32,
    },
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Completed { .. })
    }
}

/// Polls one extraction job until it reaches a terminal state
pub struct JobPoller<'a> {
    api: &'a dyn WorkoutApi,
    interval: Duration,
    redirect_delay: Duration,
    max_attempts: Option<u32>,
}

impl<'a> JobPoller<'a> {
    pub fn new(api: &'a dyn WorkoutApi, config: &PollingConfig) -> Self {
        Self {
            api,
            interval: Duration::from_millis(config.interval_ms),
            redirect_delay: Duration::from_millis(config.redirect_delay_ms),
            max_attempts: config.max_attempts,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Poll until the job finishes, fails or the status request errors
    pub async fn poll<F>(&self, job_id: &str, on_update: F) -> PollOutcome
    where
        F: FnMut(&ProgressState, &ExtractionJob),
    {
        self.poll_until(job_id, on_update, std::future::pending::<()>())
            .await
    }

    /// Like [`poll`](Self::poll) but stops early when `cancel` resolves
    ///
    /// Cancelling drops any in-flight status request; nothing is sent to the
    /// server.
    pub async fn poll_until<F, C>(&self, job_id: &str, mut on_update: F, cancel: C) -> PollOutcome
    where
        F: FnMut(&ProgressState, &ExtractionJob),
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let mut attempts: u32 = 0;
        let mut last_status: Option<JobStatus> = None;
        let mut last_job: Option<ExtractionJob> = None;

        info!("⏳ Polling extraction job {} every {:?}", job_id, self.interval);

        loop {
            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    warn!("Giving up on job {} after {} status checks", job_id, attempts);
                    return PollOutcome::GaveUp {
                        attempts,
                        last: last_job,
                    };
                }
            }
            attempts += 1;

            let fetched = tokio::select! {
                _ = &mut cancel => {
                    info!("Polling of job {} cancelled", job_id);
                    return PollOutcome::Cancelled { attempts: attempts - 1 };
                }
                result = self.api.get_extraction_status(job_id) => result,
            };

            let job = match fetched {
                Ok(job) => job,
                Err(e) => {
                    warn!("Status check for job {} failed: {}", job_id, e);
                    return PollOutcome::Errored {
                        message: STATUS_ERROR_MESSAGE,
                        source: e,
                    };
                }
            };

            let state = progress_state(&job);
            if last_status.as_ref() != Some(&job.status) {
                info!("📊 Job {} is {} ({}%)", job_id, job.status, job.progress);
                last_status = Some(job.status.clone());
            } else {
                debug!("Job {} still {} ({}%)", job_id, job.status, job.progress);
            }
            on_update(&state, &job);

            match job.status.clone() {
                JobStatus::Complete => match RedirectTarget::from_job(&job) {
                    Some(target) => {
                        info!("✅ Job {} complete, result: {:?}", job_id, target);
                        if !self.redirect_delay.is_zero() {
                            tokio::select! {
                                _ = &mut cancel => {}
                                _ = tokio::time::sleep(self.redirect_delay) => {}
                            }
                        }
                        return PollOutcome::Completed { job, target };
                    }
                    None => {
                        warn!("Job {} reported COMPLETE without a result video id", job_id);
                    }
                },
                JobStatus::Failed => {
                    let message = job
                        .error_message
                        .clone()
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                    warn!("❌ Job {} failed: {}", job_id, message);
                    return PollOutcome::Failed { job, message };
                }
                _ => {}
            }

            last_job = Some(job);

            tokio::select! {
                _ = &mut cancel => {
                    info!("Polling of job {} cancelled", job_id);
                    return PollOutcome::Cancelled { attempts };
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: &str, progress: u8) -> ExtractionJob {
        ExtractionJob {
            id: "job-1".to_string(),
            youtube_video_id: "dQw4w9WgXcQ".to_string(),
            status: JobStatus::from(status),
            progress,
            result_video_id: None,
            result_youtube_video_id: None,
            error_message: None,
        }
    }

    #[test]
    fn test_fixed_states_ignore_server_progress() {
        let cases = [
            ("PENDING", 0, "Initializing extraction..."),
            ("FETCHING", 10, "Downloading video data..."),
            ("ANALYZING_WORKOUT", 75, "Analyzing workout content..."),
            ("COMPLETE", 100, "Extraction complete!"),
            ("FAILED", 0, "Extraction failed"),
        ];

        for (status, progress, message) in cases {
            let state = progress_state(&job(status, 42));
            assert_eq!(state.status, status);
            assert_eq!(state.progress, progress);
            assert_eq!(state.message, message);
        }
    }

    #[test]
    fn test_unknown_status_uses_server_progress() {
        let state = progress_state(&job("FETCHING_DATA", 30));
        assert_eq!(state.status, "PROCESSING");
        assert_eq!(state.progress, 30);
        assert_eq!(state.message, "Processing...");

        let clamped = progress_state(&job("TRANSCODING", 250));
        assert_eq!(clamped.progress, 100);
    }

    #[test]
    fn test_labels_and_descriptions() {
        assert_eq!(format_status("ANALYZING_WORKOUT"), "ANALYZING WORKOUT");
        assert_eq!(stage_description("COMPLETE"), "Your workout is ready!");
        assert_eq!(stage_description("PROCESSING"), "Processing...");

        let state = progress_state(&job("ANALYZING_WORKOUT", 75));
        assert_eq!(state.label(), "ANALYZING WORKOUT");
        assert_eq!(
            state.description(),
            "Using AI to extract exercises, sets, and reps..."
        );
    }

    #[test]
    fn test_redirect_target_preference() {
        let mut done = job("COMPLETE", 100);
        done.result_video_id = Some(9);
        done.result_youtube_video_id = Some("abcdefghijk".to_string());
        assert_eq!(
            RedirectTarget::from_job(&done),
            Some(RedirectTarget::YoutubeVideo("abcdefghijk".to_string()))
        );

        done.result_youtube_video_id = None;
        assert_eq!(
            RedirectTarget::from_job(&done),
            Some(RedirectTarget::YoutubeVideo("dQw4w9WgXcQ".to_string()))
        );

        done.youtube_video_id = String::new();
        assert_eq!(RedirectTarget::from_job(&done), Some(RedirectTarget::Workout(9)));

        done.result_video_id = None;
        assert_eq!(RedirectTarget::from_job(&done), None);
    }
}
