use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn, error};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::assets::{AssetGenerator, CommandAssetGenerator, ExclusiveGate, SessionGate};
use crate::config::Config;
use crate::error::{Result, DubError};
use crate::filters::FilterChainSpec;
use crate::jobs::{Job, JobStore};
use crate::media::{MediaCommandBuilder, MediaProcessorFactory, MediaProcessorTrait};
use crate::sync::{SyncDecision, SyncPaths, SyncPlanner};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{Translator, TranslatorFactory};
use crate::voice::{VoiceSynthesizer, VoiceSynthesizerFactory};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// A request to dub one video into one language
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub video_path: PathBuf,
    pub target_language: String,
    /// Synthesis voice; the configured voice when unset
    pub voice_id: Option<String>,
}

impl JobRequest {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(video_path: P, target_language: S) -> Self {
        Self {
            video_path: video_path.into(),
            target_language: target_language.into(),
            voice_id: None,
        }
    }

    pub fn with_voice<S: Into<String>>(mut self, voice_id: S) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }
}

/// External collaborators the pipeline drives
pub struct PipelineServices {
    pub media: Arc<dyn MediaProcessorTrait>,
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn Translator>,
    pub voice: Arc<dyn VoiceSynthesizer>,
    pub assets: Option<Arc<dyn AssetGenerator>>,
    pub gate: Arc<dyn SessionGate>,
}

impl PipelineServices {
    /// Default service implementations built from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let assets = CommandAssetGenerator::from_config(&config.assets)
            .map(|generator| Arc::new(generator) as Arc<dyn AssetGenerator>);

        Ok(Self {
            media: Arc::from(MediaProcessorFactory::create_processor(config.media.clone())),
            transcriber: Arc::from(TranscriberFactory::create_default(config.transcriber.clone())?),
            translator: Arc::from(TranslatorFactory::create_translator(config.translate.clone())?),
            voice: Arc::from(VoiceSynthesizerFactory::create_synthesizer(config.voice.clone())?),
            assets,
            gate: Arc::new(ExclusiveGate::new()),
        })
    }
}

/// Sequences extract → transcribe → translate → voice → sync → filters per job
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<Config>,
    services: Arc<PipelineServices>,
    planner: SyncPlanner,
    commands: MediaCommandBuilder,
    jobs: JobStore,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let services = PipelineServices::from_config(&config)?;

        // Check dependencies
        services.media.check_availability()?;

        Ok(Self::with_services(config, services))
    }

    pub fn with_services(config: Config, services: PipelineServices) -> Self {
        let planner = SyncPlanner::new(&config.media);
        let commands = MediaCommandBuilder::new(&config.media.binary_path);

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            planner,
            commands,
            jobs: JobStore::new(),
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    /// Queue a job and run it in the background; returns immediately with its id
    pub async fn submit(&self, request: JobRequest) -> Result<Uuid> {
        if !request.video_path.is_file() {
            return Err(DubError::FileNotFound(request.video_path.display().to_string()));
        }

        let id = self.jobs.create().await.id;
        info!("[{}] Queued {} ({})", id, request.video_path.display(), request.target_language);

        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pipeline.run_job(id, request).await {
                error!("[{}] Could not record job state: {}", id, e);
            }
        });

        Ok(id)
    }

    /// Current state of a job
    pub async fn status(&self, id: Uuid) -> Result<Job> {
        self.jobs.get(id).await
    }

    /// Poll until the job reaches a terminal state
    pub async fn wait_for(&self, id: Uuid, poll_interval: Duration) -> Result<Job> {
        loop {
            let job = self.jobs.get(id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Run every step for a job already registered in the store.
    ///
    /// Step failures end up in the job record; the returned error only reports
    /// that the record itself could not be updated.
    pub async fn run_job(&self, id: Uuid, request: JobRequest) -> Result<()> {
        info!("[{}] === Starting pipeline ({}) ===", id, request.target_language);

        match self.execute_steps(id, &request).await {
            Ok(final_path) => {
                info!("[{}] === Pipeline success: {} ===", id, final_path.display());
                self.jobs.complete(id, "Processing complete!", final_path).await
            }
            Err(e) => {
                error!("[{}] Pipeline failed: {}", id, e);
                self.jobs.fail(id, format!("Error: {}", e)).await
            }
        }
    }

    async fn execute_steps(&self, id: Uuid, request: &JobRequest) -> Result<PathBuf> {
        let services = &self.services;
        let work_dir = &self.config.pipeline.work_dir;
        let output_dir = &self.config.pipeline.output_dir;

        self.jobs.update_progress(id, 0, "Starting pipeline...").await?;
        fs::create_dir_all(work_dir).await?;
        fs::create_dir_all(output_dir).await?;

        // Step 1: Audio extraction
        self.jobs.update_progress(id, 10, "Extracting audio...").await?;
        let audio_path = work_dir.join(format!("{}.wav", id));
        services.media.extract_audio(&request.video_path, &audio_path).await?;
        info!("[{}] [1/6] Audio extracted: {}", id, audio_path.display());

        // Step 2: Speech to text
        self.jobs.update_progress(id, 20, "Transcribing audio...").await?;
        let transcript = services.transcriber.transcribe(&audio_path).await?;
        info!("[{}] [2/6] Transcription complete: {}", id, preview(&transcript.text));

        // Step 3: Persona translation
        self.jobs.update_progress(id, 40, "Translating text...").await?;
        let translated = services.translator
            .translate(&transcript.text, &request.target_language)
            .await?;
        info!("[{}] [3/6] Translation complete: {}", id, preview(&translated));

        // Step 4: Voice synthesis
        self.jobs.update_progress(id, 60, "Generating voice...").await?;
        let voice_id = request.voice_id.as_deref().unwrap_or(&self.config.voice.voice_id);
        let voice_audio = services.voice.synthesize(&translated, voice_id).await?;
        let voice_path = work_dir.join(format!("{}_tts.{}", id, services.voice.file_extension()));
        fs::write(&voice_path, &voice_audio).await?;
        info!("[{}] [4/6] Voice generated: {}", id, voice_path.display());

        // Step 5: Duration reconciliation
        self.jobs.update_progress(id, 80, "Synchronizing audio and video...").await?;
        let synced_path = work_dir.join(format!("{}_synced.mp4", id));
        let decision = self
            .plan_sync(SyncPaths::new(&request.video_path, &voice_path, &synced_path))
            .await;
        info!("[{}] [5/6] Sync strategy: {}", id, decision.strategy);
        services.media.execute_command(decision.command).await?;

        // Step 6: Filter render
        self.jobs.update_progress(id, 90, "Applying output filters...").await?;
        let final_path = output_dir.join(format!("final_{}.mp4", id));
        let shorts = self.config.pipeline.shorts;
        if self.config.pipeline.apply_filters {
            let mut chain = FilterChainSpec::generate(&mut self.filter_rng());
            if shorts {
                chain = chain.with_shorts_layout();
            }
            info!(
                "[{}] [6/6] Filter chain: speed {:.4}, {}",
                id, chain.speed_factor, chain.color_filter
            );
            let command = self.commands.render_filtered(
                synced_path.as_path(),
                &chain.filter_complex,
                final_path.as_path(),
                &self.config.media.video_codec,
                &self.config.media.audio_codec,
                &self.config.media.preset,
            );
            services.media.execute_command(command).await?;
        } else if shorts {
            info!("[{}] [6/6] Filters disabled, resizing to 9:16", id);
            let command = self.commands.resize_to_shorts(
                synced_path.as_path(),
                final_path.as_path(),
                &self.config.media.video_codec,
                &self.config.media.preset,
            );
            services.media.execute_command(command).await?;
        } else {
            info!("[{}] [6/6] Filters disabled, copying synced output", id);
            fs::copy(&synced_path, &final_path).await?;
        }

        Ok(final_path)
    }

    /// Probe both inputs and plan the reconciliation
    pub async fn plan_sync(&self, paths: SyncPaths) -> SyncDecision {
        let (video, audio) = tokio::join!(
            self.services.media.probe_duration(&paths.video),
            self.services.media.probe_duration(&paths.audio),
        );
        info!("Video: {}, audio: {}", video, audio);

        self.planner.plan_probed(&video, &audio, &paths)
    }

    /// Plan and execute a sync for existing files
    pub async fn sync_files(&self, paths: SyncPaths) -> Result<SyncDecision> {
        let decision = self.plan_sync(paths).await;
        self.services.media.execute_command(decision.command.clone()).await?;
        Ok(decision)
    }

    /// Extract speech-recognition audio from a video
    pub async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        self.services.media.extract_audio(video_path, audio_path).await
    }

    /// Submit one job per video found below `input_dir`
    pub async fn process_directory(&self, input_dir: &Path, target_language: &str) -> Result<Vec<Uuid>> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(DubError::Config("Input path is not a directory".to_string()));
        }

        let mut video_files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if let Some(extension) = entry.path().extension() {
                if let Some(ext_str) = extension.to_str() {
                    if VIDEO_EXTENSIONS.contains(&ext_str.to_lowercase().as_str()) {
                        video_files.push(entry.path().to_path_buf());
                    }
                }
            }
        }
        video_files.sort();

        info!("Found {} video files to process", video_files.len());

        let mut ids = Vec::new();
        for video_path in video_files {
            match self.submit(JobRequest::new(&video_path, target_language)).await {
                Ok(id) => ids.push(id),
                Err(e) => warn!("Failed to queue {}: {}", video_path.display(), e),
            }
        }

        Ok(ids)
    }

    /// Generate visual assets, one generator session at a time system-wide
    pub async fn generate_assets(&self, prompts: &[String], output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let generator = self.services.assets.as_ref().ok_or_else(|| {
            DubError::Config("No asset generator command configured".to_string())
        })?;

        let output_dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.assets.output_dir.clone())
            .unwrap_or_else(|| self.config.pipeline.output_dir.join("assets"));

        if self.services.gate.is_busy() {
            info!("Asset generator session busy, request queued");
        }
        let _permit = self.services.gate.acquire().await?;

        info!("Generating assets for {} prompts into {}", prompts.len(), output_dir.display());
        generator.generate(prompts, &output_dir).await
    }

    fn filter_rng(&self) -> StdRng {
        match self.config.pipeline.filter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}
