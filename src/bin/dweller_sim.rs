//! Headless Deep Dweller Run
//!
//! Walks a scripted subject down a stone tunnel, breaking blocks and
//! jumping as it goes, and reports what the agent made of it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use deep_dweller::core::config::{load_config, DwellerConfig};
use deep_dweller::core::error::Result;
use deep_dweller::core::types::{Subject, SubjectId, Tick};
use deep_dweller::simulation::{Director, SubjectEvent};
use deep_dweller::spawn::SpawnOutcome;
use deep_dweller::world::VoxelWorld;
use glam::{DVec3, IVec3};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Deep Dweller Run - scripted tunnel walk
#[derive(Parser, Debug)]
#[command(name = "dweller_sim")]
#[command(about = "Run a scripted subject through a tunnel and report the agent's behavior")]
struct Args {
    /// Ticks to simulate
    #[arg(long, default_value_t = 6000)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the per-attempt spawn chance
    #[arg(long)]
    spawn_chance: Option<f64>,

    /// Ticks between subject steps
    #[arg(long, default_value_t = 10)]
    step_every: u64,

    /// Ticks between broken blocks
    #[arg(long, default_value_t = 40)]
    break_every: u64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    final_alert: f64,
    spawn_attempts: u32,
    spawned_at: Option<Tick>,
    cues_played: usize,
    chase_ticks: u64,
    goal_ticks: BTreeMap<String, u64>,
    final_focus: Option<[f64; 3]>,
    scent_samples: usize,
}

const TUNNEL_LENGTH: i32 = 120;

/// Stone tube along +X: floor at y = -1, ceiling at y = 4, walls at z = +-2
fn build_tunnel(world: &mut VoxelWorld) {
    world.fill(IVec3::new(-2, -1, -2), IVec3::new(TUNNEL_LENGTH, -1, 2));
    world.fill(IVec3::new(-2, 4, -2), IVec3::new(TUNNEL_LENGTH, 4, 2));
    world.fill(IVec3::new(-2, 0, -2), IVec3::new(TUNNEL_LENGTH, 3, -2));
    world.fill(IVec3::new(-2, 0, 2), IVec3::new(TUNNEL_LENGTH, 3, 2));
    world.fill(IVec3::new(-2, 0, -1), IVec3::new(-2, 3, 1));
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deep_dweller=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => DwellerConfig::default(),
    };
    if let Some(chance) = args.spawn_chance {
        config.spawn.chance = chance;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, ticks = args.ticks, "Deep Dweller run starting");

    let mut world = VoxelWorld::new();
    build_tunnel(&mut world);
    let subject_id = SubjectId::new();
    world.add_subject(Subject::new(subject_id, DVec3::new(0.5, 0.0, 0.5)));

    let mut director = Director::new(config, seed)?;
    let mut summary = RunSummary {
        seed,
        ticks: args.ticks,
        final_alert: 0.0,
        spawn_attempts: 0,
        spawned_at: None,
        cues_played: 0,
        chase_ticks: 0,
        goal_ticks: BTreeMap::new(),
        final_focus: None,
        scent_samples: 0,
    };

    let mut x = 0;
    for tick in 1..=args.ticks {
        world.set_tick(tick);

        if args.step_every > 0 && tick % args.step_every == 0 && x < TUNNEL_LENGTH - 1 {
            x += 1;
            world.move_subject(subject_id, DVec3::new(x as f64 + 0.5, 0.0, 0.5));
        } else if let Some(subject) = world.subject_mut(subject_id) {
            subject.velocity = DVec3::ZERO;
        }

        for outcome in director.on_tick(&mut world) {
            let attempted = !matches!(
                outcome,
                SpawnOutcome::BelowPhaseThreshold | SpawnOutcome::CoolingDown | SpawnOutcome::AlreadyActive
            );
            if attempted {
                summary.spawn_attempts += 1;
            }
            if outcome.is_spawned() && summary.spawned_at.is_none() {
                summary.spawned_at = Some(tick);
            }
        }

        // Events after on_tick, so this tick's decay comes first
        if args.break_every > 0 && tick % args.break_every == 0 {
            let block = IVec3::new(x + 1, 1, 1);
            director.on_subject_event(&world, subject_id, SubjectEvent::BlockBreak(block));
        }
        if tick % 97 == 0 {
            director.on_subject_event(&world, subject_id, SubjectEvent::Jump);
        }

        if director.focus().chase_engaged {
            summary.chase_ticks += 1;
        }
        if let Some(goal) = director.active_goal() {
            *summary.goal_ticks.entry(goal.to_string()).or_insert(0) += 1;
        }
        summary.cues_played += director.drain_cues().len();

        // Bodies move after the agent has issued this tick's requests
        world.advance();
    }

    summary.final_alert = director.alert_level(subject_id);
    summary.final_focus = director.focus().source.map(|s| s.to_array());
    summary.scent_samples = director.scents().trail(subject_id).map_or(0, |t| t.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Deep Dweller Run");
        println!("================");
        println!("Seed: {}", summary.seed);
        println!("Ticks: {}", summary.ticks);
        println!("Final alert: {:.2}", summary.final_alert);
        println!("Spawn attempts: {}", summary.spawn_attempts);
        match summary.spawned_at {
            Some(tick) => println!("Spawned at tick {}", tick),
            None => println!("Never spawned"),
        }
        println!("Chase ticks: {}", summary.chase_ticks);
        println!("Cues played: {}", summary.cues_played);
        println!("Scent samples held: {}", summary.scent_samples);
        for (goal, ticks) in &summary.goal_ticks {
            println!("  {:<20} {}", goal, ticks);
        }
    }

    Ok(())
}
