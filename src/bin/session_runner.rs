//! Headless Session Runner
//!
//! Plays a level with no player input and prints a summary of how it went.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use serde::Serialize;
use wellspring::breaks::{VentingBreaks, DEFAULT_MAX_BREAKS};
use wellspring::core::types::{LevelState, WellArray};
use wellspring::core::SimulationConfig;
use wellspring::level::{load_level, LevelDefinition};
use wellspring::simulation::{Session, SimulationEvent};

/// Headless Session Runner - play a level without input
#[derive(Parser, Debug)]
#[command(name = "session_runner")]
#[command(about = "Run a level headlessly and report the outcome")]
struct Args {
    /// Level file (TOML); free play when omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Simulation config file (TOML); defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run before stopping
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Display frames per second fed to advance()
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Mental breaks allowed before the level is lost
    #[arg(long, default_value_t = DEFAULT_MAX_BREAKS)]
    max_breaks: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every simulation event
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    level: String,
    seed: u64,
    elapsed: f64,
    ticks: u64,
    level_state: LevelState,
    plan_step: usize,
    plan_total: usize,
    jams: u32,
    breaks: u32,
    dispositions_started: usize,
    amount: WellArray,
    spin: WellArray,
    psyche: WellArray,
}

fn main() {
    let args = Args::parse();
    if !(args.fps.is_finite() && args.fps > 0.0) {
        eprintln!("--fps must be a positive number");
        std::process::exit(2);
    }

    let directive = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => match SimulationConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    let level = match &args.level {
        Some(path) => match load_level(path) {
            Ok(level) => level,
            Err(e) => {
                eprintln!("Failed to load level {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LevelDefinition::sandbox("Sandbox"),
    };

    let seed = level
        .seed
        .or(args.seed)
        .unwrap_or_else(rand::random);

    let breaks = Rc::new(RefCell::new(VentingBreaks::new(
        config.drive.psyche_cap,
        args.max_breaks,
    )));
    let mut session =
        Session::from_level(config, &level, seed).with_hooks(Box::new(breaks.clone()));
    session.start();

    // One display frame at --fps, in the config's frame units
    let frames_per_tick = session.config().tick.frames_per_second / args.fps;
    let mut elapsed = 0.0;
    let mut dispositions_started = 0;
    while elapsed < args.seconds {
        let Some(dt) = session.advance(frames_per_tick) else {
            break;
        };
        elapsed += dt;

        for event in session.drain_events() {
            if matches!(event, SimulationEvent::DispositionStarted { .. }) {
                dispositions_started += 1;
            }
            if args.verbose {
                tracing::debug!("{:.2}s {:?}", elapsed, event);
            }
        }
    }

    let state = session.state();
    let status = session.objective_status();
    let summary = RunSummary {
        level: session.level_name().to_string(),
        seed,
        elapsed,
        ticks: state.tick_count,
        level_state: state.level_state,
        plan_step: status.step,
        plan_total: status.total,
        jams: state.jam_count,
        breaks: breaks.borrow().breaks(),
        dispositions_started,
        amount: state.amount,
        spin: state.spin,
        psyche: state.psyche,
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("Level:        {}", summary.level);
        println!("Seed:         {}", summary.seed);
        println!("Elapsed:      {:.2}s over {} ticks", summary.elapsed, summary.ticks);
        println!("Outcome:      {:?}", summary.level_state);
        println!("Plan:         step {}/{} ({})", summary.plan_step, summary.plan_total, status.label);
        println!("Jams/breaks:  {}/{}", summary.jams, summary.breaks);
        println!("Dispositions: {}", summary.dispositions_started);
        println!("Amount:       {:?}", summary.amount.map(|v| (v * 10.0).round() / 10.0));
        println!("Spin:         {:?}", summary.spin.map(|v| (v * 10.0).round() / 10.0));
        println!("Psyche:       {:?}", summary.psyche.map(|v| (v * 10.0).round() / 10.0));
    }
}
