//! Plain-text rendering for terminal output

use std::fmt::Write;

use crate::api::models::{Creator, ExtractionJob, Workout};
use crate::catalog::{CreatorDetail, FeaturedCreator};
use crate::poller::ProgressState;
use crate::workout::{Exercise, Transparency, WorkoutPlan};
use crate::youtube::watch_url;

const BAR_WIDTH: usize = 30;
const MISSING: &str = "—";

/// Text progress bar, e.g. `[#########.....................]  30%`
pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress
    )
}

/// One status line for a polling update
pub fn progress_line(state: &ProgressState) -> String {
    format!(
        "{:<18} {}  {}",
        state.label(),
        progress_bar(state.progress),
        state.message
    )
}

pub fn job_summary(job: &ExtractionJob) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Job:      {}", job.id);
    let _ = writeln!(out, "Video:    {}", job.youtube_video_id);
    let _ = writeln!(out, "Status:   {}", job.status);
    let _ = writeln!(out, "Progress: {}", progress_bar(job.progress));
    if let Some(id) = job.result_video_id {
        let _ = writeln!(out, "Result:   workout #{}", id);
    }
    if let Some(error) = &job.error_message {
        let _ = writeln!(out, "Error:    {}", error);
    }
    out
}

fn value_or_missing(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}

/// Value with a `*` marker when it was not stated in the video
fn marked(value: &Option<String>, source: Transparency) -> String {
    match source {
        Transparency::Present => value_or_missing(value).to_string(),
        Transparency::Missing => format!("{}*", value_or_missing(value)),
    }
}

fn exercise_line(index: usize, exercise: &Exercise) -> String {
    let emoji = exercise.emoji.as_deref().map(|e| format!("{} ", e)).unwrap_or_default();
    let mut line = format!(
        "{:>2}. {}{}  sets {} | reps {} | rest {}",
        index + 1,
        emoji,
        exercise.name,
        marked(&exercise.sets, exercise.sets_source()),
        marked(&exercise.reps, exercise.reps_source()),
        marked(&exercise.rest, exercise.rest_source()),
    );
    if let Some(difficulty) = &exercise.difficulty {
        let _ = write!(line, " ({})", difficulty);
    }
    if let Some(notes) = &exercise.notes {
        let _ = write!(line, "\n      {}", notes);
    }
    line
}

fn list_or_missing(items: &[String]) -> String {
    if items.is_empty() {
        MISSING.to_string()
    } else {
        items.join(", ")
    }
}

pub fn workout_plan(plan: &WorkoutPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Type:      {}", value_or_missing(&plan.workout_type));
    let _ = writeln!(out, "Equipment: {}", list_or_missing(&plan.equipment));
    let _ = writeln!(out, "Targets:   {}", list_or_missing(&plan.target_muscles));
    let _ = writeln!(out);

    if plan.exercises.is_empty() {
        let _ = writeln!(out, "No exercises were extracted from this video.");
        return out;
    }

    for (i, exercise) in plan.exercises.iter().enumerate() {
        let _ = writeln!(out, "{}", exercise_line(i, exercise));
    }
    if plan.estimated_count() > 0 {
        let _ = writeln!(out, "\n* not stated in the video");
    }
    out
}

pub fn workout(workout: &Workout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", workout.title);
    let _ = writeln!(out, "by {}", workout.creator.name);
    let _ = writeln!(out, "{}", watch_url(&workout.youtube_video_id));
    let _ = writeln!(out, "Thumbnail: {}", workout.thumbnail());
    let _ = writeln!(out);

    match workout.plan() {
        Ok(plan) => out.push_str(&workout_plan(&plan)),
        Err(e) => {
            tracing::warn!("Workout {} has unreadable data: {}", workout.id, e);
            let _ = writeln!(out, "Workout data could not be read.");
        }
    }
    out
}

fn creator_line(creator: &Creator) -> String {
    format!("#{:<4} {:<30} {}", creator.id, creator.name, creator.profile_image())
}

pub fn creator_list(creators: &[&Creator]) -> String {
    if creators.is_empty() {
        return "No creators found.\n".to_string();
    }
    let mut out = String::new();
    for creator in creators {
        let _ = writeln!(out, "{}", creator_line(creator));
    }
    out
}

pub fn featured_creators(featured: &[FeaturedCreator]) -> String {
    if featured.is_empty() {
        return "No creators found.\n".to_string();
    }
    let mut out = String::new();
    for entry in featured {
        let noun = if entry.video_count == 1 { "workout" } else { "workouts" };
        let _ = writeln!(
            out,
            "{}  ({} {})",
            creator_line(&entry.creator),
            entry.video_count,
            noun
        );
    }
    out
}

pub fn creator_detail(detail: &CreatorDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.creator.name);
    let _ = writeln!(out, "Channel: {}", detail.creator.youtube_channel_id);
    let _ = writeln!(out, "Image:   {}", detail.creator.profile_image());
    let _ = writeln!(out);

    if detail.videos.is_empty() {
        let _ = writeln!(out, "No workouts extracted yet.");
        return out;
    }
    let _ = writeln!(out, "Workouts ({}):", detail.videos.len());
    for video in &detail.videos {
        let _ = writeln!(out, "  {}  {}", video.youtube_video_id, video.title);
    }
    out
}
