use std::path::PathBuf;

use thiserror::Error;

use crate::engine::UtteranceId;

/// Failures the narrator absorbs and reports through the log.
#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("speech synthesis is not available in this environment")]
    CapabilityUnavailable,
    #[error("speech engine failed on sentence {index} ({id}): {message}")]
    Utterance {
        index: usize,
        id: UtteranceId,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read narrator config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse narrator config {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}
