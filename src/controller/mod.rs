mod machine;

use std::sync::Arc;

use log::{debug, error, warn};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::NarratorConfig,
    engine::SpeechEngine,
    error::NarratorError,
    options::{NarrationOptions, NarrationOptionsPatch},
    state::NarrationState,
    voices::Voice,
};

use machine::{Machine, Message, Timing};

/// Observer fired on narration start or end.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
pub(crate) struct VoiceCatalog {
    pub voices: Vec<Voice>,
    pub preferred: Option<Voice>,
    pub loaded: bool,
}

#[derive(Default)]
pub(crate) struct Shared {
    pub state: RwLock<NarrationState>,
    pub options: RwLock<NarrationOptions>,
    pub voices: RwLock<VoiceCatalog>,
    on_start: Mutex<Vec<Callback>>,
    on_end: Mutex<Vec<Callback>>,
}

impl Shared {
    pub(crate) fn fire_start(&self) {
        let callbacks = self.on_start.lock().clone();
        for callback in callbacks {
            callback();
        }
    }

    pub(crate) fn fire_end(&self) {
        let callbacks = self.on_end.lock().clone();
        for callback in callbacks {
            callback();
        }
    }
}

/// Reads passages aloud sentence by sentence through a [`SpeechEngine`].
#[derive(Clone)]
pub struct Narrator {
    mailbox: Option<mpsc::UnboundedSender<Message>>,
    shared: Arc<Shared>,
}

impl Narrator {
    /// Outside a tokio runtime this degrades to [`Narrator::unavailable`].
    pub fn new(engine: Arc<dyn SpeechEngine>, config: &NarratorConfig) -> Self {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Narrator needs a tokio runtime: {err}");
                return Self::unavailable(config);
            }
        };

        let shared = Arc::new(Shared {
            options: RwLock::new(config.options.clone()),
            ..Shared::default()
        });
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let timing = Timing {
            pre_speak_delay: config.pre_speak_delay(),
            sentence_gap: config.sentence_gap(),
        };
        let mut machine = Machine::new(
            engine,
            Arc::clone(&shared),
            mailbox.downgrade(),
            timing,
            config.preferred_voices.clone(),
        );
        machine.init();
        runtime.spawn(machine.run(inbox));

        Self {
            mailbox: Some(mailbox),
            shared,
        }
    }

    pub fn unavailable(config: &NarratorConfig) -> Self {
        Self {
            mailbox: None,
            shared: Arc::new(Shared {
                options: RwLock::new(config.options.clone()),
                ..Shared::default()
            }),
        }
    }

    pub fn detect(engine: Option<Arc<dyn SpeechEngine>>, config: &NarratorConfig) -> Self {
        match engine {
            Some(engine) => Self::new(engine, config),
            None => {
                warn!("No speech engine detected, narration disabled");
                Self::unavailable(config)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.mailbox.is_some()
    }

    pub fn speak(&self, text: impl Into<String>) -> &Self {
        if self.mailbox.is_none() {
            error!("{}", NarratorError::CapabilityUnavailable);
            return self;
        }
        self.send(Message::Speak(text.into()));
        self
    }

    pub fn pause(&self) -> &Self {
        self.send(Message::Pause);
        self
    }

    pub fn resume(&self) -> &Self {
        self.send(Message::Resume);
        self
    }

    pub fn stop(&self) -> &Self {
        if self.mailbox.is_some() {
            // Queries see the stop before the loop gets to it.
            let mut state = self.shared.state.write();
            state.is_playing = false;
            state.is_paused = false;
            state.current_utterance = None;
        }
        self.send(Message::Stop);
        self
    }

    pub fn set_options(&self, patch: NarrationOptionsPatch) -> &Self {
        self.shared.options.write().apply(patch);
        self
    }

    pub fn set_voice(&self, voice: Voice) -> &Self {
        self.shared.options.write().voice = Some(voice);
        self
    }

    pub fn on_start<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.on_start.lock().push(Arc::new(callback));
        self
    }

    pub fn on_end<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.on_end.lock().push(Arc::new(callback));
        self
    }

    /// Pause, resume and speak show up here once the loop has applied them;
    /// see [`Narrator::flush`].
    pub fn state(&self) -> NarrationState {
        self.shared.state.read().clone()
    }

    pub fn options(&self) -> NarrationOptions {
        self.shared.options.read().clone()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.shared.voices.read().voices.clone()
    }

    pub fn preferred_voice(&self) -> Option<Voice> {
        self.shared.voices.read().preferred.clone()
    }

    pub fn is_voices_loaded(&self) -> bool {
        self.shared.voices.read().loaded
    }

    /// Wait until every command sent before this call has been applied.
    pub async fn flush(&self) {
        let Some(mailbox) = &self.mailbox else {
            return;
        };
        let (done, applied) = oneshot::channel();
        if mailbox.send(Message::Flush(done)).is_ok() {
            let _ = applied.await;
        }
    }

    pub fn dispose(&self) {
        self.send(Message::Dispose);
    }

    fn send(&self, message: Message) {
        if let Some(mailbox) = &self.mailbox {
            if mailbox.send(message).is_err() {
                debug!("Narrator has been disposed, dropping command");
            }
        }
    }
}
