//! Sentence-by-sentence narration of story passages over a text-to-speech
//! engine.
//!
//! [`Narrator`] owns the engine and turns `speak`/`pause`/`resume`/`stop`
//! commands into one utterance at a time, firing start and end observers for
//! each passage. [`NarratorSession`] adds the mute toggle used by playback
//! controls.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod segment;
pub mod session;
pub mod state;
pub mod voices;

pub use config::NarratorConfig;
pub use controller::{Callback, Narrator};
pub use engine::{EngineEvent, EngineEvents, SpeechEngine, Utterance, UtteranceId};
pub use error::{ConfigError, NarratorError};
pub use options::{NarrationOptions, NarrationOptionsPatch};
pub use session::{NarratorSession, PlaybackStatus};
pub use state::{NarrationState, Phase};
pub use voices::Voice;
