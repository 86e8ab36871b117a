//! Arena CLI: run Prisoner's Dilemma matches, sessions and tournaments.
//!
//! Usage:
//!   dilemma-arena list
//!   dilemma-arena match tit-for-tat grudge --rounds 50
//!   dilemma-arena games bots/mine.toml tit-for-tat always-defect random
//!   dilemma-arena tournament tit-for-tat grudge pavlov gradual --parallel
//!   dilemma-arena tournament --protagonist bots/mine.toml grudge pavlov

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dilemma_engine::{BotRegistry, GameConfig, MatchRunner, SessionRunner, TournamentRunner};

mod output;

use output::RunDir;

#[derive(Parser)]
#[command(name = "dilemma-arena", about = "Iterated Prisoner's Dilemma arena")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Settings {
    /// Game config TOML (rounds, payoff, parallel)
    #[arg(long, global = true, env = "DILEMMA_CONFIG")]
    config: Option<PathBuf>,

    /// Rounds per match
    #[arg(long, global = true, env = "DILEMMA_ROUNDS")]
    rounds: Option<u32>,

    /// Points each bot gets when both cooperate
    #[arg(long, global = true, allow_negative_numbers = true, env = "DILEMMA_MUTUAL_COOPERATION")]
    mutual_cooperation: Option<i32>,

    /// Points for defecting against a cooperator
    #[arg(long, global = true, allow_negative_numbers = true, env = "DILEMMA_BETRAYAL")]
    betrayal: Option<i32>,

    /// Points for cooperating against a defector
    #[arg(long, global = true, allow_negative_numbers = true, env = "DILEMMA_BETRAYED")]
    betrayed: Option<i32>,

    /// Points each bot gets when both defect
    #[arg(long, global = true, allow_negative_numbers = true, env = "DILEMMA_MUTUAL_DEFECTION")]
    mutual_defection: Option<i32>,

    /// Run independent matches in parallel
    #[arg(long, global = true, env = "DILEMMA_PARALLEL")]
    parallel: bool,

    /// Directory that receives one sub-directory per run
    #[arg(long, global = true, default_value = "logs", env = "DILEMMA_OUT")]
    out: PathBuf,
}

impl Settings {
    /// Config file (or defaults) with command-line overrides applied
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(value) = self.mutual_cooperation {
            config.payoff.mutual_cooperation = value;
        }
        if let Some(value) = self.betrayal {
            config.payoff.betrayal = value;
        }
        if let Some(value) = self.betrayed {
            config.payoff.betrayed = value;
        }
        if let Some(value) = self.mutual_defection {
            config.payoff.mutual_defection = value;
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in bots
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a single match between two bots
    Match {
        /// Bot id or descriptor path for seat A
        bot_a: String,
        /// Bot id or descriptor path for seat B
        bot_b: String,
    },

    /// Play one protagonist against each opponent in turn
    Games {
        /// Bot id or descriptor path
        protagonist: String,
        /// Opponent ids or descriptor paths
        #[arg(required = true)]
        opponents: Vec<String>,
    },

    /// Round robin: every pair of bots plays once
    Tournament {
        /// Bot ids or descriptor paths, in roster order
        #[arg(required = true)]
        bots: Vec<String>,
        /// Seat this bot first and file its games under `player_games/`
        #[arg(long)]
        protagonist: Option<String>,
    },
}

/// `RUST_LOG` when it parses, `info` otherwise
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    let registry = BotRegistry::with_builtins();

    match &cli.command {
        Command::List { json } => list(&registry, *json),
        Command::Match { bot_a, bot_b } => play_match(&registry, &cli.settings, bot_a, bot_b),
        Command::Games {
            protagonist,
            opponents,
        } => play_games(&registry, &cli.settings, protagonist, opponents),
        Command::Tournament { bots, protagonist } => {
            play_tournament(&registry, &cli.settings, bots, protagonist.as_deref())
        }
    }
}

fn list(registry: &BotRegistry, json: bool) -> Result<()> {
    let catalog = registry.catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let width = catalog.iter().map(|entry| entry.id.len()).max().unwrap_or(0);
    for entry in &catalog {
        println!("{:<width$}  {}: {}", entry.id, entry.name, entry.description);
    }
    Ok(())
}

fn play_match(registry: &BotRegistry, settings: &Settings, id_a: &str, id_b: &str) -> Result<()> {
    let config = settings.game_config()?;
    let mut bot_a = registry.resolve(id_a).build()?;
    let mut bot_b = registry.resolve(id_b).build()?;

    let result = MatchRunner::new(&config)?
        .run_match(bot_a.as_mut(), bot_b.as_mut())
        .with_context(|| format!("match {id_a} vs {id_b} failed"))?;

    let run = RunDir::create(&settings.out, "match")?;
    run.write_matches(".", std::slice::from_ref(&result))?;
    run.write_json("summary.json", &result)?;

    print!("{}", result.transcript());
    tracing::info!(dir = %run.path().display(), "match complete");
    Ok(())
}

fn play_games(registry: &BotRegistry, settings: &Settings, protagonist: &str, opponents: &[String]) -> Result<()> {
    let config = settings.game_config()?;
    let hero = registry.resolve(protagonist);
    let opponents = registry.resolve_all(opponents);

    let report = SessionRunner::new(&config)?.run(hero.as_ref(), &opponents)?;

    let run = RunDir::create(&settings.out, &format!("{}_games", report.protagonist))?;
    run.write_matches("games", &report.matches)?;
    run.write_text("games_summary.txt", &report.summary())?;
    run.write_json("summary.json", &report)?;

    print!("{}", report.summary());
    tracing::info!(dir = %run.path().display(), "games complete");
    Ok(())
}

fn play_tournament(
    registry: &BotRegistry,
    settings: &Settings,
    bots: &[String],
    protagonist: Option<&str>,
) -> Result<()> {
    let config = settings.game_config()?;
    let roster = registry.resolve_all(bots);

    let runner = TournamentRunner::new(&config)?;
    let report = match protagonist {
        Some(id) => runner.run_with_protagonist(&registry.resolve(id), &roster)?,
        None => runner.run(&roster)?,
    };

    let run = RunDir::create(&settings.out, "tournament")?;
    run.write_tournament(&report)?;
    run.write_text("tournament_summary.txt", &report.summary())?;
    run.write_json("summary.json", &report)?;

    print!("{}", report.summary());
    tracing::info!(dir = %run.path().display(), "tournament complete");
    Ok(())
}
