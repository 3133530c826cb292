use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use super::{EngineEvents, SpeechEngine, Utterance};
use crate::voices::Voice;

/// Engine that "speaks" by logging each sentence and pacing its words on a
/// timer. Used by the command-line narrator and for manual testing without an
/// audio device.
pub struct ConsoleEngine {
    voices: Vec<Voice>,
    word_duration: Duration,
    paused: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConsoleEngine {
    /// `word_duration` is the time one word takes at rate 1.0.
    pub fn new(voices: Vec<Voice>, word_duration: Duration) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            voices,
            word_duration,
            paused,
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl SpeechEngine for ConsoleEngine {
    fn name(&self) -> &str {
        "console"
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn watch_voices(&self, events: EngineEvents) {
        // The list is fixed at construction, so there is nothing to wait for.
        if !self.voices.is_empty() {
            events.voices_changed();
        }
    }

    fn speak(&self, utterance: Utterance, events: EngineEvents) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("Console engine needs a tokio runtime: {err}");
                events.failed(utterance.id, "no async runtime");
                return;
            }
        };

        let step = self.word_duration.div_f32(utterance.rate.max(0.1));
        let mut paused = self.paused.subscribe();
        let task = runtime.spawn(async move {
            events.started(utterance.id);
            let speaker = utterance
                .voice
                .as_ref()
                .map(|voice| voice.name.as_str())
                .unwrap_or("default voice");
            if utterance.volume <= 0.0 {
                info!("[{speaker}, muted] {}", utterance.text);
            } else {
                info!("[{speaker}] {}", utterance.text);
            }

            for word in utterance.text.split_whitespace() {
                loop {
                    let is_paused = *paused.borrow();
                    if !is_paused {
                        break;
                    }
                    if paused.changed().await.is_err() {
                        return;
                    }
                }
                debug!("{} <- {word}", utterance.id);
                tokio::time::sleep(step).await;
            }
            events.ended(utterance.id);
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    fn pause(&self) {
        self.paused.send_replace(true);
    }

    fn resume(&self) {
        self.paused.send_replace(false);
    }

    fn cancel(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.paused.send_replace(false);
    }
}
