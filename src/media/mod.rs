// Modular media processing architecture
//
// This module provides a clean abstraction over the external media toolkit:
// - Processor: FFmpeg-backed implementation of the trait below
// - Commands: Command builders and abstractions
// - Probe: Duration queries that degrade to "unknown" instead of failing

pub mod commands;
pub mod probe;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

pub use commands::*;
pub use probe::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract audio from video for speech recognition
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Query a media file's container duration
    async fn probe_duration(&self, media_path: &Path) -> ProbedDuration;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;

    /// Execute a prepared media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
