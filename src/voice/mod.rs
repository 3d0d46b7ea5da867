// Text-to-speech architecture

pub mod elevenlabs;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::config::VoiceConfig;
use crate::error::Result;

/// Main trait for voice synthesis
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice_id` and return the encoded audio bytes
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>>;

    /// File extension matching the returned audio encoding
    fn file_extension(&self) -> &'static str;
}

/// Factory for creating voice synthesizer instances
pub struct VoiceSynthesizerFactory;

impl VoiceSynthesizerFactory {
    pub fn create_synthesizer(config: VoiceConfig) -> Result<Box<dyn VoiceSynthesizer>> {
        Ok(Box::new(elevenlabs::ElevenLabsSynthesizer::new(config)?))
    }
}
