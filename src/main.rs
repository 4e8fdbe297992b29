//! Star Raid headless runner
//!
//! Plays the game with the demo pilot at a fixed 60 Hz step and reports how
//! the runs went. Useful for soak-testing level data and tuning.

mod headless {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use serde::Serialize;

    use star_raid::highscores::HighScoreEntry;
    use star_raid::sim::{Game, MenuState, TickInput, tick};
    use star_raid::{GameConfig, LevelCatalog};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(name = "star-raid")]
    #[command(about = "Run Star Raid headless with the demo pilot")]
    struct Cli {
        /// Game config JSON (missing fields use defaults)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Level catalog JSON (defaults to the built-in levels)
        #[arg(long)]
        levels: Option<PathBuf>,
        /// Override the config's run seed
        #[arg(long)]
        seed: Option<u64>,
        /// Number of runs to play
        #[arg(long, default_value_t = 1)]
        runs: u32,
        /// Frame budget per run
        #[arg(long, default_value_t = 36_000)]
        max_frames: u32,
        /// Print a JSON summary to stdout
        #[arg(long)]
        json: bool,
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        run: u32,
        outcome: &'static str,
        frames: u32,
        score: u64,
        level: u32,
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        runs: Vec<RunSummary>,
        high_score: u64,
        leaderboard: Vec<HighScoreEntry>,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let mut config = match &cli.config {
            Some(path) => GameConfig::load(path),
            None => GameConfig::default(),
        };
        if let Some(seed) = cli.seed {
            config.seed = seed;
        }
        let catalog = match &cli.levels {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading levels from {}", path.display()))?;
                LevelCatalog::from_json(&json)
                    .with_context(|| format!("parsing levels from {}", path.display()))?
            }
            None => LevelCatalog::builtin(),
        };
        log::info!(
            "Star Raid headless: seed {:#x}, {} levels, {} run(s)",
            config.seed,
            catalog.len(),
            cli.runs
        );

        let seed = config.seed;
        let mut game = Game::new(config, catalog);
        let pilot = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut runs = Vec::new();
        for run in 1..=cli.runs {
            let summary = play_one(&mut game, &pilot, run, cli.max_frames);
            log::info!(
                "Run {run}: {} after {} frames, score {} on level {}",
                summary.outcome,
                summary.frames,
                summary.score,
                summary.level
            );
            runs.push(summary);
        }

        let summary = Summary {
            seed,
            runs,
            high_score: game.state.high_score,
            leaderboard: game.high_scores().entries.clone(),
        };
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            log::info!("High score: {}", summary.high_score);
        }
        Ok(())
    }

    /// Start from the menu and play until a result menu shows or the frame
    /// budget runs out
    fn play_one(game: &mut Game, pilot: &TickInput, run: u32, max_frames: u32) -> RunSummary {
        // First frame presses start
        tick(game, pilot, DT);
        game.drain_effects();

        let mut frames = 1;
        while frames < max_frames {
            tick(game, pilot, DT);
            game.drain_effects();
            frames += 1;

            if game.menu().is_none_or(|m| m == MenuState::Start) {
                continue;
            }
            if let Some(result) = game.last_result() {
                return RunSummary {
                    run,
                    outcome: result.menu.as_str(),
                    frames,
                    score: result.score,
                    level: result.level,
                };
            }
        }

        log::warn!("Run {run} hit the {max_frames}-frame budget");
        RunSummary {
            run,
            outcome: "timeout",
            frames,
            score: game.state.score,
            level: game.state.current_level,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}
