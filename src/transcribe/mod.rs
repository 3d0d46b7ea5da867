// Speech-to-text architecture
//
// The pipeline only needs the transcript text; word timings are carried along
// for callers that want them. To add another service, implement `Transcriber`
// and extend `TranscriberImplementation` plus the factory below.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::config::TranscriberConfig;
use crate::error::Result;

/// Timing of a single recognized word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Transcript returned by a speech-to-text service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub words: Vec<WordTiming>,
}

/// Main trait for transcription operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Transcriber implementation type
#[derive(Debug, Clone)]
pub enum TranscriberImplementation {
    OpenAI,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create a transcriber based on implementation type
    pub fn create_transcriber(
        implementation: TranscriberImplementation,
        config: TranscriberConfig,
    ) -> Result<Box<dyn Transcriber>> {
        match implementation {
            TranscriberImplementation::OpenAI => {
                Ok(Box::new(openai::OpenAITranscriber::new(config)?))
            }
        }
    }

    /// Create with default implementation
    pub fn create_default(config: TranscriberConfig) -> Result<Box<dyn Transcriber>> {
        Self::create_transcriber(TranscriberImplementation::OpenAI, config)
    }
}
