//! Conquest Simulation
//! Runs a headless match until one faction holds every province or time runs out

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use warring_states::simulation::{FactionStanding, MatchEvent};
use warring_states::territory::TerritoryDataset;
use warring_states::{Match, MatchConfig};

/// Conquest Sim - AI factions compete for the province graph
#[derive(Parser, Debug)]
#[command(name = "conquest_sim")]
#[command(about = "Run a headless territory conquest match")]
struct Args {
    /// Random seed for reproducible runs (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated minutes before calling a stalemate
    #[arg(long, default_value_t = 30)]
    minutes: u64,

    /// Display-loop frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Match configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Boundary dataset (JSON); defaults to the procedural grid
    #[arg(long)]
    map: Option<PathBuf>,

    /// Let the AI drive the player faction as well
    #[arg(long, default_value_t = false)]
    all_ai: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("conquest_sim: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.all_ai {
        config.player = None;
    }

    let mut game = match &args.map {
        Some(path) => Match::new(config, &TerritoryDataset::load(path)?)?,
        None => Match::with_default_map(config)?,
    };

    println!("=== CONQUEST SIMULATION ===");
    println!(
        "Seed {}, {} provinces, {} factions",
        game.config().seed,
        game.world().provinces().len(),
        game.world().factions().len()
    );
    if let Some(player) = game.player() {
        let name = game.faction_snapshot(player).map(|f| f.name).unwrap_or_default();
        println!("Player faction {name} stands idle; everyone else is AI-driven");
    }
    println!();

    let limit = args.minutes * 60_000;
    let minute = 60_000;
    while game.now() < limit && game.winner().is_none() {
        game.run_for(minute.min(limit - game.now()), args.frame_ms);

        let mut captures = 0;
        for e in game.drain_events() {
            match e.event {
                MatchEvent::ProvinceCaptured { .. } => captures += 1,
                MatchEvent::FactionDefeated { faction } => {
                    let name = game.faction_snapshot(faction).map(|f| f.name).unwrap_or_default();
                    println!("  [{:>6.1}s] {name} has fallen", e.at as f64 / 1000.0);
                }
                _ => {}
            }
        }
        println!(
            "Minute {:>3}: {} captures, {} units in flight",
            game.now() / minute,
            captures,
            game.in_flight().len()
        );
    }

    println!();
    println!("=== FINAL STANDINGS ===");
    let mut standings = game.faction_snapshots();
    standings.sort_by(|a, b| b.province_count.cmp(&a.province_count));
    for f in standings {
        let marker = match f.standing {
            FactionStanding::Winner => "WINNER",
            FactionStanding::Defeated => "defeated",
            FactionStanding::Playing => "",
        };
        println!(
            "  {:<6} {:>3} provinces  economy {:>8.0}  grain {:>5}  generals {:>2}  {}",
            f.name,
            f.province_count,
            f.economy,
            f.grain,
            f.roster.len(),
            marker
        );
    }
    println!("Result for player: {:?}", game.result());

    Ok(())
}
