use std::{collections::VecDeque, sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use tokio::sync::{
    mpsc::{UnboundedReceiver, WeakUnboundedSender},
    oneshot,
};

use super::Shared;
use crate::{
    engine::{EngineEvent, EngineEvents, SpeechEngine, Utterance, UtteranceId},
    error::NarratorError,
    segment::split_sentences,
    voices::{select_preferred, Voice},
};

/// Everything the consumer loop reacts to.
pub(crate) enum Message {
    Speak(String),
    Pause,
    Resume,
    Stop,
    Engine(EngineEvent),
    Timer { generation: u64, timer: Timer },
    Flush(oneshot::Sender<()>),
    Dispose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Timer {
    /// The pre-speak delay of a new passage elapsed.
    BeginPassage,
    /// The gap after a finished sentence elapsed.
    NextSentence,
}

pub(crate) struct Timing {
    pub pre_speak_delay: Duration,
    pub sentence_gap: Duration,
}

/// The narration state machine. Owned by a single task; every transition is
/// the result of one [`Message`].
///
/// Each passage and each stop bumps `generation`. Timers carry the generation
/// they were scheduled under and utterance events carry their id, so anything
/// belonging to a cancelled passage is dropped before it can act.
pub(crate) struct Machine {
    engine: Arc<dyn SpeechEngine>,
    shared: Arc<Shared>,
    mailbox: WeakUnboundedSender<Message>,
    timing: Timing,
    ranked_voices: Vec<String>,
    voices_pending: bool,
    generation: u64,
    next_utterance: u64,
    pending_passage: Option<String>,
    sentences: VecDeque<String>,
    sentence_index: usize,
    /// A pause landed between two sentences; resume must dispatch the next one.
    advance_on_resume: bool,
}

impl Machine {
    pub(crate) fn new(
        engine: Arc<dyn SpeechEngine>,
        shared: Arc<Shared>,
        mailbox: WeakUnboundedSender<Message>,
        timing: Timing,
        ranked_voices: Vec<String>,
    ) -> Self {
        Self {
            engine,
            shared,
            mailbox,
            timing,
            ranked_voices,
            voices_pending: false,
            generation: 0,
            next_utterance: 1,
            pending_passage: None,
            sentences: VecDeque::new(),
            sentence_index: 0,
            advance_on_resume: false,
        }
    }

    /// Reset the engine and discover voices.
    pub(crate) fn init(&mut self) {
        self.engine.cancel();
        let voices = self.engine.voices();
        if voices.is_empty() {
            debug!("{} engine has no voices yet, waiting", self.engine.name());
            self.voices_pending = true;
            self.engine.watch_voices(self.engine_events());
        } else {
            self.load_voices(voices);
        }
    }

    pub(crate) async fn run(mut self, mut inbox: UnboundedReceiver<Message>) {
        while let Some(message) = inbox.recv().await {
            if !self.handle(message) {
                break;
            }
        }
        self.stop();
        debug!("Narrator loop finished");
    }

    /// Apply one message. Returns `false` once the narrator is disposed.
    fn handle(&mut self, message: Message) -> bool {
        match message {
            Message::Speak(text) => self.speak(text),
            Message::Pause => self.pause(),
            Message::Resume => self.resume(),
            Message::Stop => self.stop(),
            Message::Engine(event) => self.on_engine_event(event),
            Message::Timer { generation, timer } => {
                if generation != self.generation {
                    debug!("Dropping stale {timer:?} timer");
                } else {
                    self.on_timer(timer);
                }
            }
            Message::Flush(done) => {
                let _ = done.send(());
            }
            Message::Dispose => {
                info!("Disposing narrator");
                return false;
            }
        }
        true
    }

    fn speak(&mut self, text: String) {
        self.stop();
        self.pending_passage = Some(text);
        self.schedule(Timer::BeginPassage, self.timing.pre_speak_delay);
    }

    fn pause(&mut self) {
        let mut state = self.shared.state.write();
        if !state.is_playing || state.is_paused {
            debug!("Ignoring pause: narration is not playing");
            return;
        }
        state.is_paused = true;
        drop(state);
        self.engine.pause();
    }

    fn resume(&mut self) {
        let mut state = self.shared.state.write();
        if !state.is_paused {
            debug!("Ignoring resume: narration is not paused");
            return;
        }
        state.is_paused = false;
        drop(state);
        self.engine.resume();

        if std::mem::take(&mut self.advance_on_resume) {
            self.dispatch_next();
        }
    }

    fn stop(&mut self) {
        self.engine.cancel();
        self.generation += 1;
        self.pending_passage = None;
        self.sentences.clear();
        self.sentence_index = 0;
        self.advance_on_resume = false;

        let mut state = self.shared.state.write();
        state.is_playing = false;
        state.is_paused = false;
        state.current_utterance = None;
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::BeginPassage => {
                let Some(passage) = self.pending_passage.take() else {
                    return;
                };
                self.sentences = split_sentences(&passage).into();
                if self.sentences.is_empty() {
                    debug!("Passage has no sentences to narrate");
                    return;
                }
                info!("Narrating passage of {} sentence(s)", self.sentences.len());
                self.dispatch_next();
            }
            Timer::NextSentence => {
                if self.shared.state.read().is_paused {
                    debug!("Narration paused between sentences");
                    self.advance_on_resume = true;
                } else {
                    self.dispatch_next();
                }
            }
        }
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::VoicesChanged => {
                if std::mem::take(&mut self.voices_pending) {
                    let voices = self.engine.voices();
                    self.load_voices(voices);
                }
            }
            EngineEvent::Started(id) => {
                if !self.is_current(id) {
                    return;
                }
                let mut state = self.shared.state.write();
                if state.is_playing {
                    return;
                }
                state.is_playing = true;
                state.is_paused = false;
                drop(state);
                self.shared.fire_start();
            }
            EngineEvent::Ended(id) => {
                if self.is_current(id) {
                    self.sentence_finished();
                }
            }
            EngineEvent::Failed { id, message } => {
                if self.is_current(id) {
                    error!(
                        "{}",
                        NarratorError::Utterance {
                            index: self.sentence_index,
                            id,
                            message,
                        }
                    );
                    self.sentence_finished();
                }
            }
        }
    }

    fn sentence_finished(&mut self) {
        self.shared.state.write().current_utterance = None;

        if self.sentences.is_empty() {
            let mut state = self.shared.state.write();
            state.is_playing = false;
            state.is_paused = false;
            drop(state);
            self.sentence_index = 0;
            info!("Narration finished");
            self.shared.fire_end();
        } else {
            self.schedule(Timer::NextSentence, self.timing.sentence_gap);
        }
    }

    fn dispatch_next(&mut self) {
        let Some(text) = self.sentences.pop_front() else {
            return;
        };
        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        self.sentence_index += 1;

        let options = self.shared.options.read().clone();
        let voice = options
            .voice
            .or_else(|| self.shared.voices.read().preferred.clone());
        let utterance = Utterance {
            id,
            text: text.clone(),
            rate: options.rate,
            pitch: options.pitch,
            volume: options.volume,
            voice,
        };

        {
            let mut state = self.shared.state.write();
            state.current_text = text;
            state.current_utterance = Some(id);
        }
        debug!("Dispatching sentence {} as {id}", self.sentence_index);
        self.engine.speak(utterance, self.engine_events());
    }

    fn load_voices(&mut self, voices: Vec<Voice>) {
        let preferred = select_preferred(&voices, &self.ranked_voices);
        match &preferred {
            Some(voice) => info!("Narrator voice: {} ({})", voice.name, voice.lang),
            None => warn!("No voices reported, using the engine default"),
        }
        let mut catalog = self.shared.voices.write();
        catalog.voices = voices;
        catalog.preferred = preferred;
        catalog.loaded = true;
    }

    fn is_current(&self, id: UtteranceId) -> bool {
        let current = self.shared.state.read().current_utterance;
        if current != Some(id) {
            debug!("Ignoring event for {id}, it is no longer in flight");
            return false;
        }
        true
    }

    /// Fire `timer` after `delay`, or right away when there is no delay.
    fn schedule(&mut self, timer: Timer, delay: Duration) {
        if delay.is_zero() {
            self.on_timer(timer);
            return;
        }

        let message = Message::Timer {
            generation: self.generation,
            timer,
        };
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox.send(message);
            }
        });
    }

    fn engine_events(&self) -> EngineEvents {
        let mailbox = self.mailbox.clone();
        EngineEvents::new(move |event| {
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox.send(Message::Engine(event));
            }
        })
    }
}
