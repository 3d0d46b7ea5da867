// OpenAI Whisper API implementation

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, debug};

use crate::config::TranscriberConfig;
use crate::error::{Result, DubError};
use super::{Transcriber, Transcript, WordTiming};

/// `verbose_json` response of the transcription endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperApiResponse {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub words: Vec<WhisperApiWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperApiWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl From<WhisperApiResponse> for Transcript {
    fn from(response: WhisperApiResponse) -> Self {
        Transcript {
            text: response.text.trim().to_string(),
            language: response.language,
            duration: response.duration,
            words: response
                .words
                .into_iter()
                .map(|w| WordTiming {
                    word: w.word,
                    start: w.start,
                    end: w.end,
                })
                .collect(),
        }
    }
}

pub struct OpenAITranscriber {
    client: Client,
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/v1/audio/transcriptions", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        info!("Transcribing {} with {}", audio_path.display(), self.config.model);

        let api_key = self.config.resolve_api_key()?;

        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            DubError::Transcription(format!("Failed to read {}: {}", audio_path.display(), e))
        })?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());

        let form = Form::new()
            .part("file", Part::bytes(audio).file_name(file_name))
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        let url = self.endpoint_url();
        debug!("Sending transcription request to: {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DubError::Transcription(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Transcription(format!(
                "Transcription API error {}: {}", status, error_text
            )));
        }

        let body: WhisperApiResponse = response.json().await
            .map_err(|e| DubError::Transcription(format!("Failed to parse response: {}", e)))?;

        let transcript = Transcript::from(body);
        if transcript.text.is_empty() {
            return Err(DubError::Transcription("Empty transcript received".to_string()));
        }

        info!(
            "Transcription completed: {} characters, {} timed words",
            transcript.text.chars().count(),
            transcript.words.len()
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbose_json() {
        let raw = r#"{
            "task": "transcribe",
            "language": "korean",
            "duration": 3.2,
            "text": "  안녕하세요 여러분 ",
            "words": [
                {"word": "안녕하세요", "start": 0.0, "end": 1.1},
                {"word": "여러분", "start": 1.2, "end": 2.0}
            ]
        }"#;

        let response: WhisperApiResponse = serde_json::from_str(raw).unwrap();
        let transcript = Transcript::from(response);

        assert_eq!(transcript.text, "안녕하세요 여러분");
        assert_eq!(transcript.language.as_deref(), Some("korean"));
        assert_eq!(transcript.duration, Some(3.2));
        assert_eq!(transcript.words.len(), 2);
        assert_eq!(transcript.words[1].start, 1.2);
    }

    #[test]
    fn test_parse_without_words() {
        let response: WhisperApiResponse = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        let transcript = Transcript::from(response);
        assert!(transcript.words.is_empty());
        assert!(transcript.language.is_none());
    }

    #[test]
    fn test_endpoint_url_trims_trailing_slash() {
        let config = TranscriberConfig {
            endpoint: "http://localhost:9000/".to_string(),
            ..TranscriberConfig::default()
        };
        let transcriber = OpenAITranscriber::new(config).unwrap();
        assert_eq!(transcriber.endpoint_url(), "http://localhost:9000/v1/audio/transcriptions");
    }

    #[tokio::test]
    async fn test_missing_audio_file_is_transcription_error() {
        let config = TranscriberConfig {
            api_key: Some("sk-test".to_string()),
            ..TranscriberConfig::default()
        };
        let transcriber = OpenAITranscriber::new(config).unwrap();
        let err = transcriber
            .transcribe(Path::new("/nonexistent/dubsync/audio.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, DubError::Transcription(_)));
    }
}
