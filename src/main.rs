//! Millipede Arcade headless runner
//!
//! Plays autopilot runs against a local leaderboard and prints the final
//! standings as JSON. Renderers embed the library instead.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use millipede_arcade::leaderboard::LocalLeaderboard;
use millipede_arcade::sim::{GameState, TickInput};
use millipede_arcade::{Driver, Phase, Session, Tuning};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base seed; run n uses a seed derived from it
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Tick limit per run
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,
    /// Number of runs to play
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// Balance overrides (JSON)
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Initials committed after each run
    #[arg(long, default_value = "CPU")]
    initials: String,
    /// Leaderboard file, created if missing
    #[arg(long)]
    scores: Option<PathBuf>,
}

/// Chase the lowest millipede head and keep firing
fn autopilot(game: &GameState) -> TickInput {
    let player = game.store.player.pos;
    let target = game
        .store
        .millipedes
        .iter()
        .filter_map(|m| m.head())
        .max_by_key(|h| h.cell.y)
        .map(|h| h.cell.x as f32);

    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    if let Some(x) = target {
        input.left = x < player.x - 0.25;
        input.right = x > player.x + 0.25;
    }
    // Step back from anything in the zone that gets close
    let threatened = game
        .store
        .spiders
        .iter()
        .map(|s| s.pos)
        .chain(game.store.bees.iter().map(|b| b.pos))
        .any(|p| (p - player).length() < 3.0 && p.y <= player.y);
    input.down = threatened;
    input
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let board = match &cli.scores {
        Some(path) => LocalLeaderboard::load(path)
            .with_context(|| format!("loading leaderboard from {}", path.display()))?,
        None => LocalLeaderboard::new(),
    };

    log::info!("Millipede Arcade (headless) starting, seed {}", cli.seed);
    let mut driver = Driver::new(Session::new(cli.seed, tuning), board);

    for run in 0..cli.runs {
        driver.start()?;
        let mut ticks = 0;
        while ticks < cli.ticks && driver.session().phase() == Phase::Playing {
            let input = driver.session().game().map(autopilot).unwrap_or_default();
            driver.frame(&input);
            ticks += 1;
        }
        let (score, level) = (driver.session().score(), driver.session().level());
        log::info!(
            "Run {} ended after {} ticks: score {}, level {}",
            run + 1,
            ticks,
            score,
            level
        );

        if driver.session().phase() == Phase::Playing {
            // Tick limit reached: the run still counts
            log::info!("Tick limit reached, ending run {}", run + 1);
            driver.abandon_run()?;
        }
        driver.commit_initials(&cli.initials)?;
    }

    println!("{}", serde_json::to_string_pretty(driver.view().standings)?);

    if let Some(path) = &cli.scores {
        driver
            .into_backend()
            .save(path)
            .with_context(|| format!("saving leaderboard to {}", path.display()))?;
    }
    Ok(())
}
