//! Run a bot-only match and print how it went.
//!
//! Usage: cargo run --bin pick-or-perish -- [--config match.toml] [--seed 7] [--bots 6]
//!
//! Set `RUST_LOG=pick_or_perish=debug` to watch the session.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pick_or_perish::bots::{Absentee, Guesser, LevelKGuesser, RandomGuesser, SimulationConfig};
use pick_or_perish::{simulate, MatchConfig, MatchRecord};

/// Simulate a pick-or-perish match between bots
#[derive(Parser, Debug)]
#[command(name = "pick-or-perish")]
#[command(about = "Simulate an elimination number-guessing match", long_about = None)]
struct Args {
    /// TOML match configuration (defaults to the standard rules)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of bots
    #[arg(long, default_value_t = 5)]
    bots: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Abort after this many rounds
    #[arg(long, default_value_t = 200)]
    max_rounds: u32,

    /// Encode and decode the record, then check that it replays to the same scores
    #[arg(long)]
    verify: bool,
}

fn roster(count: usize) -> Vec<Box<dyn Guesser>> {
    (0..count)
        .map(|i| -> Box<dyn Guesser> {
            match i % 3 {
                0 => Box::new(RandomGuesser),
                1 => Box::new(LevelKGuesser::new(u32::try_from(i).unwrap_or(1), 3)),
                _ => Box::new(Absentee::new(LevelKGuesser::new(1, 5), 0.1)),
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let match_config = match &args.config {
        Some(path) => MatchConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => MatchConfig::default().with_timings(0, 25, 0),
    };
    info!(bots = args.bots, seed = args.seed, rules = match_config.rules.rules().len(), "simulating");

    let config = SimulationConfig::new(match_config, args.seed).with_max_rounds(args.max_rounds);
    let record = simulate(&config, roster(args.bots))?;

    for round in &record.rounds {
        let target = round
            .outcome
            .target
            .map_or_else(|| "duel".to_string(), |t| format!("{t:.2}"));
        let picks: Vec<String> = round.submissions.iter().map(|(p, v)| format!("{}={v}", p.raw())).collect();
        println!(
            "round {:>3}  target {:>6}  winners {:?}  picks [{}]",
            round.round,
            target,
            round.outcome.winner_ids.iter().map(|p| p.raw()).collect::<Vec<_>>(),
            picks.join(" ")
        );
    }

    match record.winner {
        Some(winner) => println!("{winner} wins after {} rounds", record.rounds.len()),
        None => println!("no winner after {} rounds", record.rounds.len()),
    }
    for (player, score) in &record.final_scores {
        println!("  {player}: {score}");
    }

    if args.verify {
        let bytes = record.to_bytes()?;
        let decoded = MatchRecord::from_bytes(&bytes)?;
        if decoded != record {
            println!("record: {} bytes, decoded record differs", bytes.len());
        } else {
            match decoded.verify()? {
                None => println!("record: {} bytes, decoded and replay matches", bytes.len()),
                Some(mismatch) => println!("record: {} bytes, replay MISMATCH {mismatch:?}", bytes.len()),
            }
        }
    }

    Ok(())
}
