//! Playback controls driving a narrator end to end.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use story_narrator::{
    engine::{ConsoleEngine, EngineCall, ScriptedEngine},
    Narrator, NarratorConfig, NarratorSession, PlaybackStatus, SpeechEngine, Voice,
};

fn session_with(engine: &Arc<ScriptedEngine>) -> NarratorSession {
    let engine: Arc<dyn SpeechEngine> = engine.clone();
    NarratorSession::new(Narrator::new(engine, &NarratorConfig::immediate()))
}

#[tokio::test]
async fn muting_stops_narration_and_drops_new_passages() {
    let engine = Arc::new(ScriptedEngine::with_voices(vec![Voice::new("Daniel", "en-GB")]));
    let session = session_with(&engine);

    session.speak("The forest was quiet. Then the wind rose.");
    session.narrator().flush().await;
    engine.start(engine.current().unwrap());
    session.narrator().flush().await;
    assert!(session.status().shows_pause_control());

    assert!(session.toggle_mute());
    assert_eq!(
        session.status(),
        PlaybackStatus {
            is_playing: false,
            is_paused: false,
            is_muted: true,
        }
    );
    session.narrator().flush().await;
    assert_eq!(engine.calls().last(), Some(&EngineCall::Cancel));

    session.speak("Nobody hears this.");
    session.narrator().flush().await;
    assert_eq!(engine.spoken_texts(), vec!["The forest was quiet."]);

    assert!(!session.toggle_mute());
    session.speak("Back again.");
    session.narrator().flush().await;
    assert_eq!(engine.spoken_texts().last().unwrap(), "Back again.");
}

#[tokio::test]
async fn controls_reflect_pause_and_resume() {
    let engine = Arc::new(ScriptedEngine::new());
    let session = session_with(&engine);

    session.speak("One. Two.");
    session.narrator().flush().await;
    engine.start(engine.current().unwrap());
    session.pause();
    session.narrator().flush().await;

    let status = session.status();
    assert!(status.is_playing);
    assert!(status.is_paused);
    assert!(!status.is_muted);

    session.resume();
    session.narrator().flush().await;
    assert!(!session.status().is_paused);

    session.stop();
    session.narrator().flush().await;
    assert!(!session.status().shows_pause_control());
}

#[tokio::test(start_paused = true)]
async fn console_engine_narrates_a_whole_passage() {
    let engine: Arc<dyn SpeechEngine> = Arc::new(ConsoleEngine::new(
        vec![Voice::new("Console Narrator", "en-US")],
        Duration::from_millis(100),
    ));
    let narrator = Narrator::new(engine, &NarratorConfig::default());
    let ends = Arc::new(AtomicUsize::new(0));
    {
        let ends = Arc::clone(&ends);
        narrator.on_end(move || {
            ends.fetch_add(1, Ordering::SeqCst);
        });
    }

    narrator.speak("Hello there. How are you? I am fine!");
    tokio::time::sleep(Duration::from_secs(5)).await;
    narrator.flush().await;

    assert_eq!(ends.load(Ordering::SeqCst), 1);
    let state = narrator.state();
    assert!(!state.is_playing);
    assert_eq!(state.current_text, "I am fine!");
    assert_eq!(narrator.preferred_voice().unwrap().name, "Console Narrator");
}
