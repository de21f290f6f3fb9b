//! Lunk - Entry Point
//!
//! Line-oriented shell around the simulation. Loads a level (the built-in
//! meadow unless a path is given), then steps it one command at a time.

use lunk::core::error::Result;
use lunk::core::types::Role;
use lunk::level::Level;
use lunk::simulation::{Simulation, SimulationEvent, TickReport, TurnCommand};
use lunk::storage::{record_high_score, JsonFileStore};

use std::io::{self, Write};
use std::path::Path;

const DEFAULT_LEVEL: &str = include_str!("../levels/meadow.toml");
const HIGH_SCORE_FILE: &str = "lunk_highscore.json";

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lunk=info")),
        )
        .init();

    tracing::info!("Lunk starting...");

    let level = match std::env::args().nth(1) {
        Some(path) => Level::load(Path::new(&path))?,
        None => Level::from_toml_str(DEFAULT_LEVEL)?,
    };
    let seed: u64 = rand::random();
    let mut sim = Simulation::from_level(&level, seed)?;
    let dt = sim.config().tick_seconds;

    println!("\n=== LUNK ===");
    println!("Level '{}' (seed {})", level.name, seed);
    println!();
    println!("Commands:");
    println!("  l / r / n         - Tick once turning left, right, or straight");
    println!("  run <n> [l|r|n]   - Run n ticks with the same input");
    println!("  status / s        - Show every agent");
    println!("  quit / q          - Exit the game");
    println!();

    loop {
        display_status(&sim);

        if sim.is_over() {
            break;
        }

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "status" || input == "s" {
            display_detailed_status(&sim);
            continue;
        }

        if let Some(rest) = input.strip_prefix("run ") {
            let mut parts = rest.split_whitespace();
            match parts.next().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) => {
                    let command = parts
                        .next()
                        .map(TurnCommand::parse_lenient)
                        .unwrap_or_default();
                    for _ in 0..n {
                        let report = sim.tick(command, dt);
                        print_events(&report);
                        if report.game_over.is_some() {
                            break;
                        }
                    }
                }
                None => println!("Usage: run <number> [l|r|n]"),
            }
            continue;
        }

        let report = sim.tick(TurnCommand::parse_lenient(input), dt);
        print_events(&report);
    }

    let final_vitality = sim.current_vitality();
    let mut store = JsonFileStore::new(HIGH_SCORE_FILE);
    if record_high_score(&mut store, final_vitality.high_score)? {
        println!("New high score: {}", final_vitality.high_score);
    }

    println!(
        "\nGoodbye! Final score {} after {} ticks.",
        final_vitality.high_score,
        sim.current_tick()
    );
    Ok(())
}

fn print_events(report: &TickReport) {
    for event in &report.events {
        match event {
            SimulationEvent::Affection { .. } | SimulationEvent::Vitality { .. } => {}
            other => println!("  [tick {}] {:?}", report.tick, other),
        }
    }
}

/// Display a brief status summary
fn display_status(sim: &Simulation) {
    let v = sim.current_vitality();
    let alive = |role: Role| {
        sim.agents()
            .iter()
            .filter(|a| a.role == role && a.is_alive())
            .count()
    };

    println!();
    println!(
        "--- Tick {} | Health {} | Score {} | Boredom {} | Next touch: {:?} ---",
        sim.current_tick(),
        v.health,
        v.high_score,
        v.boredom,
        sim.current_interaction_option()
    );
    println!(
        "  Enemies left: {}, ladies waiting: {}",
        alive(Role::Enemy),
        alive(Role::RescueTarget)
    );
    if let Some(reason) = sim.game_over() {
        println!("  GAME OVER: {:?}", reason);
    }
}

/// Display detailed status of all agents
fn display_detailed_status(sim: &Simulation) {
    println!();
    println!("=== Detailed Status (Tick {}) ===", sim.current_tick());
    for agent in sim.agents() {
        let label = match (agent.role, agent.kind) {
            (Role::Enemy, Some(kind)) => format!("{:?}", kind),
            (role, _) => format!("{:?}", role),
        };
        println!(
            "  {} {:<12} ({:6.2}, {:6.2}) heading {:6.1} deg, speed {:.1}, {:?}",
            agent.id,
            label,
            agent.position.x,
            agent.position.y,
            agent.heading.radians().to_degrees(),
            agent.speed,
            agent.life
        );
    }
    println!();
}
