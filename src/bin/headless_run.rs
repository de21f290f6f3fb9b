//! Headless Runner
//!
//! Plays a level with a scripted input sequence and prints a run summary.
//! Same seed and script always give the same summary.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use lunk::core::error::Result;
use lunk::level::Level;
use lunk::simulation::{GameOverReason, Simulation, SimulationEvent, TurnCommand};
use lunk::storage::{record_high_score, JsonFileStore};

const DEFAULT_LEVEL: &str = include_str!("../../levels/meadow.toml");

/// Headless Runner - scripted Lunk runs
#[derive(Parser, Debug)]
#[command(name = "headless_run")]
#[command(about = "Run a Lunk level without a display and print a summary")]
struct Args {
    /// Level TOML file (defaults to the built-in meadow)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Turn script of l/r/n characters, cycled one per tick
    #[arg(long, default_value = "n")]
    input: String,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Record the final score in this high-score file
    #[arg(long)]
    highscore: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct EventCounts {
    interactions: u32,
    enemies_landed: u32,
    targets_saved: u32,
    targets_lost: u32,
    falls: u32,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct RunSummary {
    level: String,
    seed: u64,
    ticks: u64,
    health: u32,
    score: u64,
    boredom: u32,
    game_over: Option<GameOverReason>,
    events: EventCounts,
    new_high_score: Option<bool>,
}

fn parse_script(script: &str) -> Vec<TurnCommand> {
    let commands: Vec<TurnCommand> = script
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| TurnCommand::parse_lenient(&c.to_string()))
        .collect();
    if commands.is_empty() {
        vec![TurnCommand::None]
    } else {
        commands
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lunk=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::from_toml_str(DEFAULT_LEVEL)?,
    };
    let mut sim = Simulation::from_level(&level, seed)?;
    let dt = sim.config().tick_seconds;
    let script = parse_script(&args.input);

    let mut counts = EventCounts::default();
    for (_, command) in (0..args.ticks).zip(script.iter().cycle()) {
        let report = sim.tick(*command, dt);
        for event in &report.events {
            match event {
                SimulationEvent::Interaction { .. } => counts.interactions += 1,
                SimulationEvent::EnemyLanded { .. } => counts.enemies_landed += 1,
                SimulationEvent::TargetSaved { .. } => counts.targets_saved += 1,
                SimulationEvent::TargetLost { .. } => counts.targets_lost += 1,
                SimulationEvent::PlayerFell { .. } => counts.falls += 1,
                _ => {}
            }
        }
        if report.game_over.is_some() {
            break;
        }
    }

    let vitality = sim.current_vitality();
    let new_high_score = match &args.highscore {
        Some(path) => Some(record_high_score(
            &mut JsonFileStore::new(path.clone()),
            vitality.high_score,
        )?),
        None => None,
    };

    let summary = RunSummary {
        level: level.name.clone(),
        seed,
        ticks: sim.current_tick(),
        health: vitality.health,
        score: vitality.high_score,
        boredom: vitality.boredom,
        game_over: sim.game_over(),
        events: counts,
        new_high_score,
    };

    match args.format.as_str() {
        "text" => {
            println!("Level: {} (seed {})", summary.level, summary.seed);
            println!("Ticks: {}", summary.ticks);
            println!(
                "Health {} | Score {} | Boredom {}",
                summary.health, summary.score, summary.boredom
            );
            match summary.game_over {
                Some(reason) => println!("Game over: {:?}", reason),
                None => println!("Still playing"),
            }
            println!(
                "Interactions {}, landed {}, saved {}, lost {}, falls {}",
                summary.events.interactions,
                summary.events.enemies_landed,
                summary.events.targets_saved,
                summary.events.targets_lost,
                summary.events.falls
            );
        }
        _ => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}
