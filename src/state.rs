use serde::Serialize;

use crate::engine::UtteranceId;

/// Playback phase of the narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Snapshot of the narrator's run-time state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationState {
    pub is_playing: bool,
    pub is_paused: bool,
    /// Sentence most recently handed to the engine.
    pub current_text: String,
    /// In-flight utterance, if any.
    pub current_utterance: Option<UtteranceId>,
}

impl NarrationState {
    pub fn phase(&self) -> Phase {
        match (self.is_playing, self.is_paused) {
            (true, true) => Phase::Paused,
            (true, false) => Phase::Playing,
            _ => Phase::Idle,
        }
    }
}
