//! Dubsync - Automated Video Dubbing Workflow
//!
//! Command-line entry point: loads configuration, sets up logging and drives
//! the dubbing pipeline.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};
use uuid::Uuid;

use dubsync::cli::{Args, Commands};
use dubsync::config::Config;
use dubsync::filters::FilterChainSpec;
use dubsync::jobs::{Job, JobStatus};
use dubsync::media::{DurationProbe, MediaProcessorFactory};
use dubsync::sync::{SyncPaths, SyncPlanner};
use dubsync::workflow::{JobRequest, Pipeline};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Dubsync - Automated Video Dubbing Workflow");

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("dubsync.toml").exists() {
                info!("Found dubsync.toml in current directory, loading...");
                Config::from_file("dubsync.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Process { input, target_lang, output_dir, no_filters, shorts, voice, json } => {
            info!("Processing video file: {}", input.display());

            if let Some(dir) = output_dir {
                config.pipeline.output_dir = dir;
            }
            if no_filters {
                config.pipeline.apply_filters = false;
            }
            if shorts {
                config.pipeline.shorts = true;
            }

            let mut request = JobRequest::new(input, target_lang);
            if let Some(voice) = voice {
                request = request.with_voice(voice);
            }

            let pipeline = Pipeline::new(config)?;
            let id = pipeline.submit(request).await?;
            let job = follow_job(&pipeline, id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&job)?);
            } else {
                print_job(&job);
            }

            if job.status == JobStatus::Failed {
                anyhow::bail!("Job {} failed: {}", job.id, job.message);
            }
        }
        Commands::Batch { input_dir, target_lang, output_dir, shorts, voice } => {
            if let Some(dir) = output_dir {
                config.pipeline.output_dir = dir;
            }
            if shorts {
                config.pipeline.shorts = true;
            }
            if let Some(voice) = voice {
                config.voice.voice_id = voice;
            }

            let pipeline = Pipeline::new(config)?;
            let ids = pipeline.process_directory(&input_dir, &target_lang).await?;
            for id in ids {
                pipeline.wait_for(id, POLL_INTERVAL).await?;
            }

            let mut failed = 0;
            for job in pipeline.jobs().list().await {
                if job.status == JobStatus::Failed {
                    failed += 1;
                    warn!("Job {} failed: {}", job.id, job.message);
                }
                print_job(&job);
            }

            if failed > 0 {
                anyhow::bail!("{} job(s) failed", failed);
            }
        }
        Commands::Probe { input } => {
            let probe = DurationProbe::new(&config.media.probe_path);
            let duration = probe.probe(&input).await;
            println!("{}: {}", input.display(), duration);
        }
        Commands::Plan { video, audio, output } => {
            let probe = DurationProbe::new(&config.media.probe_path);
            let (video_duration, audio_duration) = tokio::join!(probe.probe(&video), probe.probe(&audio));

            let planner = SyncPlanner::new(&config.media);
            let decision = planner.plan_probed(
                &video_duration,
                &audio_duration,
                &SyncPaths::new(video, audio, output),
            );

            println!("Video:    {}", video_duration);
            println!("Audio:    {}", audio_duration);
            println!("Delta:    {:+.3}s", decision.delta);
            println!("Strategy: {}", decision.strategy);
            println!("Command:  {}", decision.command);
        }
        Commands::Sync { video, audio, output } => {
            let pipeline = Pipeline::new(config)?;
            let decision = pipeline.sync_files(SyncPaths::new(video, audio, &output)).await?;
            println!("Synced with {} -> {}", decision.strategy, output.display());
        }
        Commands::Filters { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let chain = FilterChainSpec::generate(&mut rng);
            println!("{}", serde_json::to_string_pretty(&chain)?);
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let pipeline = Pipeline::new(config)?;
            pipeline.extract_audio(&input, &output).await?;
        }
        Commands::Assets { prompts, output_dir } => {
            let content = tokio::fs::read_to_string(&prompts).await?;
            let prompts: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();

            let pipeline = Pipeline::new(config)?;
            let images = pipeline.generate_assets(&prompts, output_dir.as_deref()).await?;
            for image in images {
                println!("{}", image.display());
            }
        }
        Commands::Check => {
            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;
            println!("{}", media.get_version_info().await?);
        }
    }

    info!("Dubsync completed successfully");
    Ok(())
}

/// Poll a job, mirroring its progress on a progress bar
async fn follow_job(pipeline: &Pipeline, id: Uuid) -> Result<Job> {
    let pb = ProgressBar::new(100);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
        .progress_chars("#>-"));

    loop {
        let job = pipeline.status(id).await?;
        pb.set_position(job.progress as u64);
        pb.set_message(job.message.clone());

        if job.status.is_terminal() {
            pb.finish_with_message(job.message.clone());
            return Ok(job);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_job(job: &Job) {
    println!("Job:      {}", job.id);
    println!("Status:   {} ({}%)", job.status, job.progress);
    println!("Message:  {}", job.message);
    if let Some(location) = &job.result_location {
        println!("Result:   {}", location.display());
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".dubsync").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "dubsync.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("dubsync.log").display());

    Ok(())
}
