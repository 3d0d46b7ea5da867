// Translation architecture
//
// - Persona: style instructions and language names for prompts
// - OpenAI: chat-completion backed translator

pub mod openai;
pub mod persona;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

pub use persona::*;
use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Rewrite `text` in `target_language` following the configured persona
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        Ok(Box::new(openai::ChatTranslator::new(config)?))
    }
}
