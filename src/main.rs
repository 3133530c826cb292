use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use log::{error, info};
use story_narrator::{
    engine::ConsoleEngine, logging, segment::split_sentences, Narrator, NarratorConfig,
    NarratorSession, SpeechEngine, Voice,
};
use tokio::{io::AsyncReadExt, sync::Notify};

const WORD_DURATION: Duration = Duration::from_millis(280);

async fn read_passage(path: Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("unable to read passage {}", path.display())),
        None => {
            let mut passage = String::new();
            tokio::io::stdin()
                .read_to_string(&mut passage)
                .await
                .context("unable to read passage from stdin")?;
            Ok(passage)
        }
    }
}

async fn run() -> Result<()> {
    let config = NarratorConfig::from_env().context("failed to load narrator config")?;
    let passage = read_passage(std::env::args_os().nth(1).map(PathBuf::from)).await?;
    if split_sentences(&passage).is_empty() {
        info!("Nothing to narrate");
        return Ok(());
    }

    let engine: Arc<dyn SpeechEngine> = Arc::new(ConsoleEngine::new(
        vec![
            Voice::new("Console Narrator", "en-US"),
            Voice::new("Console Conteur", "fr-FR"),
        ],
        WORD_DURATION,
    ));
    let session = NarratorSession::new(Narrator::new(engine, &config));

    let finished = Arc::new(Notify::new());
    {
        let finished = Arc::clone(&finished);
        session
            .narrator()
            .on_start(|| info!("Narration started"))
            .on_end(move || finished.notify_one());
    }

    session.speak(passage);
    tokio::select! {
        _ = finished.notified() => info!("Narration complete"),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping narration");
            session.stop();
        }
    }
    session.narrator().dispose();
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialise logger: {err:?}");
    }
    info!("Starting story narrator");

    if let Err(err) = run().await {
        error!("Narrator failed: {err:?}");
        std::process::exit(1);
    }
}
