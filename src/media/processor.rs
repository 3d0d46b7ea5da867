use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, DubError};
use super::{DurationProbe, MediaProcessorTrait, MediaCommand, MediaCommandBuilder, ProbedDuration};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    probe: DurationProbe,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);
        let probe = DurationProbe::new(&config.probe_path);

        Self {
            config,
            command_builder,
            probe,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Extract audio from video
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
    ) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        let command = self.command_builder.extract_audio(
            video_path,
            audio_path,
            self.config.extract_sample_rate,
            self.config.extract_channels,
        );
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn probe_duration(&self, media_path: &Path) -> ProbedDuration {
        self.probe.probe(media_path).await
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| DubError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(DubError::Media("Media processor version check failed".to_string()))
        }
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let command = self.command_builder.version_check();
        let output = tokio::process::Command::new(&command.binary_path)
            .args(&command.args)
            .output()
            .await
            .map_err(|e| DubError::Media(format!("Failed to execute media processor: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            // First line carries the version
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DubError::Media(format!("Media processor version check failed: {}", stderr)))
        }
    }

    /// Execute a prepared media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()> {
        info!("Executing media processing command: {}", command.description);
        command.execute().await
    }
}
