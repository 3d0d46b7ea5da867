use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, debug};

use crate::config::VoiceConfig;
use crate::error::{Result, DubError};
use super::VoiceSynthesizer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub model_id: String,
}

/// ElevenLabs text-to-speech client
pub struct ElevenLabsSynthesizer {
    client: Client,
    config: VoiceConfig,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: VoiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.endpoint.trim_end_matches('/'),
            voice_id
        )
    }
}

#[async_trait]
impl VoiceSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(DubError::Synthesis("Nothing to synthesize".to_string()));
        }
        if voice_id.trim().is_empty() {
            return Err(DubError::Synthesis("No voice selected".to_string()));
        }

        info!("Synthesizing {} characters with voice {}", text.chars().count(), voice_id);

        let api_key = self.config.resolve_api_key()?;
        let request = SpeechRequest {
            text: text.to_string(),
            model_id: self.config.model_id.clone(),
        };

        let url = self.endpoint_url(voice_id);
        debug!("Sending synthesis request to: {}", url);

        let response = self.client
            .post(&url)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| DubError::Synthesis(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Synthesis(format!(
                "Voice API error {}: {}", status, error_text
            )));
        }

        let audio = response.bytes().await
            .map_err(|e| DubError::Synthesis(format!("Failed to read audio: {}", e)))?;

        if audio.is_empty() {
            return Err(DubError::Synthesis("Empty audio received".to_string()));
        }

        info!("Voice synthesis completed: {} bytes", audio.len());
        Ok(audio.to_vec())
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }
}
