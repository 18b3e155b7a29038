use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use workout_extract::api::WorkoutApi;
use workout_extract::poller::{JobPoller, PollOutcome, RedirectTarget};
use workout_extract::youtube::{self, WorkoutRef};
use workout_extract::{catalog, render};
use workout_extract::{Config, ExtractError, ExtractionStart, HttpApiClient, Workout};

#[derive(Parser)]
#[command(name = "workout-extract")]
#[command(version, about = "Turn YouTube workout videos into structured routines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the extraction API (overrides config and environment)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a YouTube URL for extraction and wait for the workout
    Extract {
        /// YouTube video URL
        url: String,
        /// Print the job id and exit instead of waiting
        #[arg(long)]
        no_wait: bool,
    },
    /// Show the status of an extraction job
    Status {
        job_id: String,
        /// Keep polling until the job completes or fails
        #[arg(long)]
        watch: bool,
    },
    /// Show an extracted workout by numeric id, YouTube id or URL
    Workout { id: String },
    /// Download the PDF version of a workout
    ExportPdf {
        /// YouTube video id or URL
        video: String,
        /// Output file (defaults to <output_dir>/<video id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List creators in the catalog
    Creators {
        /// Only show creators whose name contains this text
        #[arg(long)]
        search: Option<String>,
        /// Show the featured creators with their workout counts
        #[arg(long)]
        featured: bool,
    },
    /// Show a creator and their extracted workouts
    Creator { id: i64 },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    if let Some(api_base) = &cli.api_base {
        config.api.base_url = api_base.clone();
    }
    if cli.verbose {
        config.output.log_level = "debug".to_string();
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("workout_extract={},warn", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_workout(workout: &Workout, json: bool) -> Result<()> {
    if json {
        print_json(workout)
    } else {
        print!("{}", render::workout(workout));
        Ok(())
    }
}

async fn fetch_target(api: &dyn WorkoutApi, target: &RedirectTarget) -> workout_extract::Result<Workout> {
    match target {
        RedirectTarget::YoutubeVideo(id) => api.get_workout_by_youtube_id(id).await,
        RedirectTarget::Workout(id) => api.get_workout_details(*id).await,
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Poll a job to the end and print the result; returns an error for any
/// outcome other than completion
async fn follow_job(api: &dyn WorkoutApi, config: &Config, job_id: &str, json: bool) -> Result<()> {
    let poller = JobPoller::new(api, &config.polling);
    let outcome = poller
        .poll_until(
            job_id,
            |state, _job| {
                if !json {
                    eprintln!("{}", render::progress_line(state));
                }
            },
            shutdown_signal(),
        )
        .await;

    match outcome {
        PollOutcome::Completed { target, .. } => {
            let workout = fetch_target(api, &target).await?;
            print_workout(&workout, json)
        }
        PollOutcome::Failed { message, .. } => Err(anyhow::anyhow!(message)),
        PollOutcome::Errored { message, source } => {
            debug!("Status polling error: {:?}", source);
            Err(anyhow::anyhow!(message))
        }
        PollOutcome::GaveUp { attempts, .. } => Err(anyhow::anyhow!(
            "Job {} did not finish after {} status checks",
            job_id,
            attempts
        )),
        PollOutcome::Cancelled { .. } => {
            eprintln!("Stopped watching job {}. Resume with: workout-extract status {} --watch", job_id, job_id);
            Ok(())
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let client = HttpApiClient::new(&config.api)?;
    let api: &dyn WorkoutApi = &client;
    debug!("{}", config.summary());

    match cli.command {
        Commands::Extract { url, no_wait } => {
            let video_id = youtube::validate_url(&url)?;
            info!("🎬 Submitting video {} for extraction", video_id);

            match api.initiate_extraction(url.trim()).await? {
                ExtractionStart::Existing(workout) => {
                    info!("Video {} was already extracted", video_id);
                    print_workout(&workout, cli.json)?;
                }
                ExtractionStart::Queued { job_id } => {
                    if cli.json && no_wait {
                        print_json(&serde_json::json!({ "jobId": job_id }))?;
                    } else if no_wait {
                        println!("{}", job_id);
                    } else {
                        eprintln!("Extraction job {} started", job_id);
                        follow_job(api, &config, &job_id, cli.json).await?;
                    }
                }
            }
        }
        Commands::Status { job_id, watch } => {
            if watch {
                follow_job(api, &config, &job_id, cli.json).await?;
            } else {
                let job = api.get_extraction_status(&job_id).await?;
                if cli.json {
                    print_json(&job)?;
                } else {
                    print!("{}", render::job_summary(&job));
                }
            }
        }
        Commands::Workout { id } => {
            let workout = match youtube::parse_workout_ref(&id)? {
                WorkoutRef::Id(numeric) => api.get_workout_details(numeric).await?,
                WorkoutRef::Video(video_id) => api.get_workout_by_youtube_id(&video_id).await?,
            };
            print_workout(&workout, cli.json)?;
        }
        Commands::ExportPdf { video, output } => {
            let video_id = youtube::resolve_video_id(&video)?;
            let path = output.unwrap_or_else(|| config.output.output_dir.join(format!("{}.pdf", video_id)));

            let pdf = api.export_workout_pdf(&video_id).await?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &pdf)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Saved {} bytes to {}", pdf.len(), path.display());
            println!("{}", path.display());
        }
        Commands::Creators { search, featured } => {
            if featured {
                let featured = catalog::featured_creators(api, config.catalog.featured_limit).await?;
                if cli.json {
                    print_json(&featured)?;
                } else {
                    print!("{}", render::featured_creators(&featured));
                }
            } else {
                let creators = api.get_creators().await?;
                let matched = catalog::filter_creators(&creators, search.as_deref().unwrap_or(""));
                if cli.json {
                    print_json(&matched)?;
                } else {
                    print!("{}", render::creator_list(&matched));
                }
            }
        }
        Commands::Creator { id } => {
            let detail = catalog::creator_detail(api, id).await?;
            if cli.json {
                print_json(&detail)?;
            } else {
                print!("{}", render::creator_detail(&detail));
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };
    init_logging(&config.output.log_level);

    if let Err(e) = run(cli, config).await {
        let message = match e.downcast_ref::<ExtractError>() {
            Some(err) => {
                debug!("{}", err);
                err.user_message()
            }
            None => format!("{:#}", e),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}
