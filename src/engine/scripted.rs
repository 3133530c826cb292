use parking_lot::Mutex;

use super::{EngineEvents, SpeechEngine, Utterance, UtteranceId};
use crate::voices::Voice;

/// A call the narrator made on a [`ScriptedEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    WatchVoices,
    Speak(Utterance),
    Pause,
    Resume,
    Cancel,
}

#[derive(Default)]
struct Script {
    voices: Vec<Voice>,
    voice_watchers: Vec<EngineEvents>,
    calls: Vec<EngineCall>,
    in_flight: Vec<(UtteranceId, EngineEvents)>,
}

/// Engine that renders nothing. It records every call and lets the caller
/// decide when utterances start, end or fail.
///
/// Cancelled utterances stay addressable, so late notifications from a
/// cancelled utterance can still be delivered, as real engines sometimes do.
#[derive(Default)]
pub struct ScriptedEngine {
    script: Mutex<Script>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let engine = Self::default();
        engine.script.lock().voices = voices;
        engine
    }

    /// Replace the voice list and notify every pending watcher once.
    pub fn publish_voices(&self, voices: Vec<Voice>) {
        let watchers = {
            let mut script = self.script.lock();
            script.voices = voices;
            std::mem::take(&mut script.voice_watchers)
        };
        for watcher in watchers {
            watcher.voices_changed();
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.script.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }

    /// Utterances handed to the engine, oldest first.
    pub fn spoken(&self) -> Vec<Utterance> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Speak(utterance) => Some(utterance.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|utterance| utterance.text).collect()
    }

    /// Most recent utterance still held by the engine.
    pub fn current(&self) -> Option<UtteranceId> {
        self.script.lock().in_flight.last().map(|(id, _)| *id)
    }

    pub fn start(&self, id: UtteranceId) {
        if let Some(events) = self.events_for(id) {
            events.started(id);
        }
    }

    pub fn finish(&self, id: UtteranceId) {
        if let Some(events) = self.release(id) {
            events.ended(id);
        }
    }

    pub fn fail(&self, id: UtteranceId, message: &str) {
        if let Some(events) = self.release(id) {
            events.failed(id, message);
        }
    }

    /// Start and finish the current utterance. Returns its id.
    pub fn play_current(&self) -> Option<UtteranceId> {
        let id = self.current()?;
        self.start(id);
        self.finish(id);
        Some(id)
    }

    fn events_for(&self, id: UtteranceId) -> Option<EngineEvents> {
        self.script
            .lock()
            .in_flight
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, events)| events.clone())
    }

    fn release(&self, id: UtteranceId) -> Option<EngineEvents> {
        let mut script = self.script.lock();
        let position = script
            .in_flight
            .iter()
            .position(|(candidate, _)| *candidate == id)?;
        Some(script.in_flight.remove(position).1)
    }
}

impl SpeechEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn voices(&self) -> Vec<Voice> {
        self.script.lock().voices.clone()
    }

    fn watch_voices(&self, events: EngineEvents) {
        let mut script = self.script.lock();
        script.calls.push(EngineCall::WatchVoices);
        script.voice_watchers.push(events);
    }

    fn speak(&self, utterance: Utterance, events: EngineEvents) {
        let mut script = self.script.lock();
        script.in_flight.push((utterance.id, events));
        script.calls.push(EngineCall::Speak(utterance));
    }

    fn pause(&self) {
        self.script.lock().calls.push(EngineCall::Pause);
    }

    fn resume(&self) {
        self.script.lock().calls.push(EngineCall::Resume);
    }

    fn cancel(&self) {
        self.script.lock().calls.push(EngineCall::Cancel);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::EngineEvent;

    fn utterance(id: u64, text: &str) -> Utterance {
        Utterance {
            id: UtteranceId(id),
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }

    fn recording_sink() -> (EngineEvents, Arc<Mutex<Vec<EngineEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            EngineEvents::new(move |event| seen.lock().push(event))
        };
        (sink, seen)
    }

    #[test]
    fn reports_scripted_lifecycle() {
        let engine = ScriptedEngine::new();
        let (sink, seen) = recording_sink();
        engine.speak(utterance(1, "Hello."), sink);

        assert_eq!(engine.play_current(), Some(UtteranceId(1)));
        assert_eq!(
            *seen.lock(),
            vec![
                EngineEvent::Started(UtteranceId(1)),
                EngineEvent::Ended(UtteranceId(1))
            ]
        );
        assert!(engine.current().is_none());
    }

    #[test]
    fn cancelled_utterances_can_still_report() {
        let engine = ScriptedEngine::new();
        let (sink, seen) = recording_sink();
        engine.speak(utterance(1, "Hello."), sink);
        engine.cancel();
        engine.fail(UtteranceId(1), "interrupted");
        engine.finish(UtteranceId(1));

        assert_eq!(
            *seen.lock(),
            vec![EngineEvent::Failed {
                id: UtteranceId(1),
                message: "interrupted".into()
            }]
        );
        assert_eq!(engine.calls().last(), Some(&EngineCall::Cancel));
    }

    #[test]
    fn publishing_voices_notifies_watchers_once() {
        let engine = ScriptedEngine::new();
        let (sink, seen) = recording_sink();
        engine.watch_voices(sink);
        engine.publish_voices(vec![Voice::new("Daniel", "en-GB")]);
        engine.publish_voices(vec![]);

        assert_eq!(*seen.lock(), vec![EngineEvent::VoicesChanged]);
    }
}
