use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, debug};

use crate::config::TranslateConfig;
use crate::error::{Result, DubError};
use super::{Translator, persona_prompt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Content of the first choice, trimmed; `None` when absent or blank
    pub fn first_content(&self) -> Option<String> {
        self.choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
    }
}

/// Translator backed by a chat-completion endpoint
pub struct ChatTranslator {
    client: Client,
    config: TranslateConfig,
}

impl ChatTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn build_request(&self, text: &str, target_language: &str) -> ChatRequest {
        let system_prompt = persona_prompt(
            target_language,
            &self.config.tone,
            self.config.persona.as_deref(),
        );

        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        }
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        info!("Translating {} characters to {}", text.chars().count(), target_language);

        let api_key = self.config.resolve_api_key()?;
        let request = self.build_request(text, target_language);
        let url = format!("{}/v1/chat/completions", self.config.endpoint.trim_end_matches('/'));

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubError::Translation(format!(
                "Translation API error {}: {}", status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await
            .map_err(|e| DubError::Translation(format!("Failed to parse response: {}", e)))?;

        chat_response
            .first_content()
            .ok_or_else(|| DubError::Translation("Empty translation received".to_string()))
    }
}
