use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, DubError};

fn default_timeout_secs() -> u64 {
    300
}

fn default_apply_filters() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary, used for duration queries
    pub probe_path: String,
    /// Encoder used whenever the video stream has to be re-encoded
    pub video_codec: String,
    /// Single target codec every output audio stream is normalized to
    pub audio_codec: String,
    /// Encoder speed preset for re-encoded video
    pub preset: String,
    /// Sample rate of audio extracted for transcription
    pub extract_sample_rate: u32,
    /// Channel count of audio extracted for transcription
    pub extract_channels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Base URL of the speech-to-text API
    pub endpoint: String,
    /// Speech-to-text model
    pub model: String,
    /// API key; when unset the key is read from `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Base URL of the chat-completion API
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    /// Tone passed to the persona prompt
    pub tone: String,
    /// Replaces the built-in persona prompt when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Base URL of the text-to-speech API
    pub endpoint: String,
    /// Voice used when a job does not name one
    pub voice_id: String,
    /// Synthesis model
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory for intermediate files (extracted audio, voice track, synced video)
    pub work_dir: PathBuf,
    /// Directory for final renders
    pub output_dir: PathBuf,
    /// Apply the randomized filter chain to the synced video
    #[serde(default = "default_apply_filters")]
    pub apply_filters: bool,
    /// Fixed seed for the filter chain; unset means a fresh seed per render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_seed: Option<u64>,
    /// Convert the final render to a vertical 9:16 layout
    #[serde(default)]
    pub shorts: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// External generator command; receives the prompt file and output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra arguments placed before the prompt file and output directory
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "fast".to_string(),
            extract_sample_rate: 16000,
            extract_channels: 1,
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            tone: "casual".to_string(),
            persona: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.elevenlabs.io".to_string(),
            voice_id: "JBFqnCBsd6RMkjVDRZzb".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            api_key: None,
            api_key_env: "ELEVENLABS_API_KEY".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(".dubsync/work"),
            output_dir: PathBuf::from(".dubsync/outputs"),
            apply_filters: true,
            filter_seed: None,
            shorts: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Resolve an API key from an explicit value or the named environment variable
pub fn resolve_api_key(explicit: Option<&str>, env_var: &str, service: &str) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }

    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(DubError::Config(format!(
            "{} API key not provided (set it in the config or in ${})",
            service, env_var
        ))),
    }
}

impl TranscriberConfig {
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env, "Transcription")
    }
}

impl TranslateConfig {
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env, "Translation")
    }
}

impl VoiceConfig {
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env, "Voice synthesis")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [media]
            binary_path = "/opt/ffmpeg/bin/ffmpeg"
            probe_path = "/opt/ffmpeg/bin/ffprobe"
            video_codec = "libx265"
            audio_codec = "aac"
            preset = "medium"
            extract_sample_rate = 16000
            extract_channels = 1

            [pipeline]
            work_dir = "/tmp/work"
            output_dir = "/tmp/out"
            filter_seed = 7
            shorts = true
            "#,
        )
        .unwrap();

        assert_eq!(config.media.video_codec, "libx265");
        assert_eq!(config.pipeline.filter_seed, Some(7));
        assert!(config.pipeline.apply_filters);
        assert!(config.pipeline.shorts);
        assert!(!Config::default().pipeline.shorts);
        assert_eq!(config.voice.model_id, "eleven_multilingual_v2");
        assert_eq!(config.translate.model, "gpt-4o");
        assert!(config.assets.command.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dubsync.toml");

        let mut config = Config::default();
        config.translate.persona = Some("You are a calm narrator.".to_string());
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.translate.persona.as_deref(), Some("You are a calm narrator."));
        assert_eq!(reloaded.media.binary_path, "ffmpeg");
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let err = Config::from_toml("[media]\nbinary_path = 3").unwrap_err();
        assert!(matches!(err, DubError::Config(_)));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let key = resolve_api_key(Some("sk-test"), "DUBSYNC_TEST_UNSET_VAR", "Test").unwrap();
        assert_eq!(key, "sk-test");

        let err = resolve_api_key(None, "DUBSYNC_TEST_UNSET_VAR", "Test").unwrap_err();
        assert!(err.to_string().contains("DUBSYNC_TEST_UNSET_VAR"));
    }
}
