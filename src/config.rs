use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, options::NarrationOptions, voices::DEFAULT_PREFERRED_VOICES};

const CONFIG_ENV: &str = "NARRATOR_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "runtime/narrator.json";

/// Narrator settings. Every field may be omitted from a config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarratorConfig {
    /// Wait between cancelling the previous passage and starting a new one.
    pub pre_speak_delay_ms: u64,
    /// Pause inserted between two sentences of a passage.
    pub sentence_gap_ms: u64,
    pub options: NarrationOptions,
    /// Voice names tried in rank order when picking the narrator voice.
    pub preferred_voices: Vec<String>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            pre_speak_delay_ms: 50,
            sentence_gap_ms: 200,
            options: NarrationOptions::default(),
            preferred_voices: DEFAULT_PREFERRED_VOICES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl NarratorConfig {
    /// Configuration without any pacing delays.
    pub fn immediate() -> Self {
        Self {
            pre_speak_delay_ms: 0,
            sentence_gap_ms: 0,
            ..Self::default()
        }
    }

    /// Load `path`, falling back to the defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let data =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config: Self = serde_json::from_str(&data)
            .map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        config.options = config.options.sanitised();
        info!("Loaded narrator config from {}", path.display());
        Ok(config)
    }

    /// Load the file named by `NARRATOR_CONFIG`, or `runtime/narrator.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_or_default(path)
    }

    pub fn pre_speak_delay(&self) -> Duration {
        Duration::from_millis(self.pre_speak_delay_ms)
    }

    pub fn sentence_gap(&self) -> Duration {
        Duration::from_millis(self.sentence_gap_ms)
    }
}
