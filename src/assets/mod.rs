// Visual asset generation from text prompts
//
// The generator itself is an external program; this module only hands it the
// prompts, runs it behind a `SessionGate`, and collects the images it leaves
// in the output directory.

pub mod gate;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{info, debug};
use walkdir::WalkDir;

#[cfg(test)]
use mockall::automock;

pub use gate::*;
use crate::config::AssetsConfig;
use crate::error::{Result, DubError};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Main trait for prompt-to-image generation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssetGenerator: Send + Sync {
    /// Generate images for `prompts` into `output_dir`, returning the new files
    async fn generate(&self, prompts: &[String], output_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Runs `<command> <args...> <prompts.json> <output_dir>`
pub struct CommandAssetGenerator {
    command: String,
    args: Vec<String>,
}

impl CommandAssetGenerator {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Build from config; `None` when no generator command is configured
    pub fn from_config(config: &AssetsConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|command| Self::new(command.clone(), config.args.clone()))
    }
}

#[async_trait]
impl AssetGenerator for CommandAssetGenerator {
    async fn generate(&self, prompts: &[String], output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir).await?;

        let prompt_file = output_dir.join("prompts.json");
        fs::write(&prompt_file, serde_json::to_vec_pretty(prompts)?).await?;

        let before = collect_images(output_dir);
        debug!("Running asset generator {} {:?}", self.command, self.args);

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&prompt_file)
            .arg(output_dir)
            .output()
            .await
            .map_err(|e| DubError::Asset(format!("Failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::Asset(format!(
                "Asset generator exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let produced: Vec<PathBuf> = collect_images(output_dir)
            .difference(&before)
            .cloned()
            .collect();

        info!("Asset generator produced {} images for {} prompts", produced.len(), prompts.len());
        Ok(produced)
    }
}

/// Image files below `dir`, sorted
pub fn collect_images(dir: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}
