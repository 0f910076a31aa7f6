use anyhow::{Context, Result};
use chat_completion::CompletionSettings;
use command_rules::StaticRule;
use serde::{Deserialize, Serialize};
use speech_io::{RecognitionConfig, SynthesisConfig};
use std::fs;
use std::path::Path;
use wake_session::SessionConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub completion: CompletionSettings,
    /// Extra fixed-reply commands, checked after the built-in ones.
    #[serde(default)]
    pub rules: Vec<StaticRule>,
}

impl Config {
    /// Load from `path`, writing the defaults there when the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))
        } else {
            let config = Self::default();
            config.save(path)?;
            tracing::info!(path = %path.display(), "default config written");
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }
}
