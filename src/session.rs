use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{debug, info};
use serde::Serialize;

use crate::controller::Narrator;

/// What the narration controls need to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_muted: bool,
}

impl PlaybackStatus {
    /// The pause/resume control is only offered while a passage is playing.
    pub fn shows_pause_control(&self) -> bool {
        self.is_playing
    }
}

/// UI-facing narrator: adds muting on top of [`Narrator`].
///
/// Muting stops the current passage and drops passages requested while muted.
#[derive(Clone)]
pub struct NarratorSession {
    narrator: Narrator,
    muted: Arc<AtomicBool>,
}

impl NarratorSession {
    pub fn new(narrator: Narrator) -> Self {
        Self {
            narrator,
            muted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn speak(&self, text: impl Into<String>) {
        if self.is_muted() {
            debug!("Narration muted, skipping passage");
            return;
        }
        self.narrator.speak(text);
    }

    pub fn pause(&self) {
        self.narrator.pause();
    }

    pub fn resume(&self) {
        self.narrator.resume();
    }

    pub fn stop(&self) {
        self.narrator.stop();
    }

    /// Flip the mute state and return the new value.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::SeqCst);
        if muted {
            self.narrator.stop();
        }
        info!("Narration {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Follows [`Narrator::state`]: a stop or mute shows at once, pause and
    /// resume once the narrator has applied them.
    pub fn status(&self) -> PlaybackStatus {
        let state = self.narrator.state();
        PlaybackStatus {
            is_playing: state.is_playing,
            is_paused: state.is_paused,
            is_muted: self.is_muted(),
        }
    }
}
