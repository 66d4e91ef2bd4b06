pub mod audio;
pub mod cue;
pub mod keys;
pub mod persistence;
pub mod player;
pub mod resources;
pub mod sequencer;
pub mod state;

use std::sync::Arc;
use anyhow::Result;
use tokio::io::AsyncBufReadExt;

use audio::{AudioOutput, CpalOutput, SilentOutput, WavProbe};
use player::CuePlayer;
use resources::{DirCatalog, ResourceResolver};
use sequencer::TokioScheduler;

pub fn run() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting Keypad Cues v{}", env!("CARGO_PKG_VERSION"));

    // One control thread drives every drain step
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve())
}

async fn serve() -> Result<()> {
    let settings = match persistence::settings_path() {
        Ok(path) => persistence::load_settings(&path),
        Err(e) => {
            tracing::warn!("{}. Using default settings.", e);
            state::Settings::default()
        }
    };

    let output: Box<dyn AudioOutput> = match CpalOutput::new() {
        Ok(output) => Box::new(output),
        Err(e) => {
            tracing::warn!("Audio output unavailable: {:#}. Cues will be silent.", e);
            Box::new(SilentOutput::new())
        }
    };

    let player = CuePlayer::new(
        Arc::new(std::sync::Mutex::new(output)),
        Arc::new(TokioScheduler::current()),
    );
    player.set_enabled(settings.general.sound_feedback);

    let resolver = ResourceResolver::new(
        Box::new(DirCatalog::new(&settings.cues.asset_root)),
        settings.cues.namespaces.candidates(),
    );
    tracing::info!(
        "Looking up cues under {:?} in {:?}",
        settings.cues.asset_root,
        resolver.candidates()
    );
    player.initialize(&resolver, &WavProbe);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        keys::handle_line(&player, &line);
    }

    // Let queued cues finish before tearing down
    while player.sequencer().is_playing() {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    player.release();

    tracing::info!("Input closed, shutting down");
    Ok(())
}
