use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use marker_tap::display::TracingDisplay;
use marker_tap::playtest::{AutoPlayer, play_round};
use marker_tap::round::RandomIndices;
use marker_tap::store::JsonFileStore;
use marker_tap::{GameConfig, Session};

/// Plays the reflex game headlessly with a scripted player.
#[derive(Debug, Parser)]
#[command(name = "marker-tap", version)]
struct Args {
    /// Seed for target draws. Omit for a random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of blocks in the row (overrides the config file).
    #[arg(long)]
    blocks: Option<usize>,

    /// Rounds to play back to back.
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Tap off-target from this level on. Without it the player never misses.
    #[arg(long)]
    miss_at_level: Option<u32>,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Per-round frame cap.
    #[arg(long, default_value_t = 60 * 60 * 5)]
    max_frames: usize,

    /// JSON game config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Score store file. Defaults to $MARKER_TAP_SCORES_PATH or the user config dir.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print one JSON object per round instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(blocks) = args.blocks {
        config = config.with_block_count(blocks);
    }

    let store = match &args.store {
        Some(path) => JsonFileStore::open(path.clone()),
        None => JsonFileStore::from_env(),
    };
    tracing::info!(path = %store.path().display(), "using score store");

    let rng = match args.seed {
        Some(seed) => RandomIndices::seeded(seed),
        None => RandomIndices::from_entropy(),
    };

    let mut session = Session::new(config, store, rng, TracingDisplay)?;
    let player = AutoPlayer {
        miss_at_level: args.miss_at_level,
    };

    for round in 1..=args.rounds {
        let report = play_round(&mut session, player, args.fps, args.max_frames);
        if !report.ended {
            // Perfect play never misses; close the round so the summary and flush happen.
            session.stop_game();
        }
        if args.json {
            let line = serde_json::json!({
                "round": round,
                "report": report,
                "session": session.snapshot(),
            });
            println!("{line}");
        } else {
            println!(
                "round {round}: score {} level {} best {} ({} frames{})",
                report.score,
                report.level,
                report.best,
                report.frames,
                if report.ended { "" } else { ", capped" }
            );
        }
    }

    session.shutdown();
    Ok(())
}
