pub mod console;
pub mod scripted;

use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::voices::Voice;

pub use console::ConsoleEngine;
pub use scripted::{EngineCall, ScriptedEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` lets the engine use its own default voice.
    pub voice: Option<Voice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
    Failed { id: UtteranceId, message: String },
    /// The voice list became available or changed.
    VoicesChanged,
}

/// Reporting never blocks.
#[derive(Clone)]
pub struct EngineEvents {
    report: Arc<dyn Fn(EngineEvent) + Send + Sync>,
}

impl EngineEvents {
    pub fn new<F>(report: F) -> Self
    where
        F: Fn(EngineEvent) + Send + Sync + 'static,
    {
        Self {
            report: Arc::new(report),
        }
    }

    pub fn started(&self, id: UtteranceId) {
        (self.report)(EngineEvent::Started(id));
    }

    pub fn ended(&self, id: UtteranceId) {
        (self.report)(EngineEvent::Ended(id));
    }

    pub fn failed(&self, id: UtteranceId, message: impl Into<String>) {
        (self.report)(EngineEvent::Failed {
            id,
            message: message.into(),
        });
    }

    pub fn voices_changed(&self) {
        (self.report)(EngineEvent::VoicesChanged);
    }
}

impl fmt::Debug for EngineEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEvents").finish_non_exhaustive()
    }
}

/// Platform text-to-speech. Methods must return promptly.
pub trait SpeechEngine: Send + Sync {
    fn name(&self) -> &str;

    /// May be empty while the engine is still loading.
    fn voices(&self) -> Vec<Voice>;

    fn watch_voices(&self, events: EngineEvents);

    fn speak(&self, utterance: Utterance, events: EngineEvents);

    fn pause(&self);

    fn resume(&self);

    /// Drop every pending and in-flight utterance.
    fn cancel(&self);
}
