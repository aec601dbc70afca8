//! arena: waves of agents chasing orbiting players.
//!
//! Wires every tickforge crate together: a TOML config (`[sim]` is a
//! `SimConfig`, `[arena]` the scenario), CSV agent templates, scheduled
//! spawn-wave tasks, a CRITICAL maintenance task, the event bus, and a
//! JSON Lines delta stream plus per-tick CSV diagnostics.
//!
//! ```text
//! cargo run -p arena -- --config demos/arena/config/arena.toml
//! RUST_LOG=tf_sim=debug cargo run -p arena -- --realtime --ticks 200
//! ```

use std::cell::Cell;
use std::f32::consts::TAU;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tf_agent::{TemplateSet, load_templates_csv, load_templates_reader};
use tf_core::{EntityId, Fault, SimConfig, SimRng, Vec2};
use tf_net::{DeltaSink, JsonLinesSink, PublishObserver};
use tf_schedule::{SystemClock, TaskPriority};
use tf_sim::{DamageLedger, EventKind, ExternalEntity, SimBuilder, SimEvent, World};
use tf_spatial::{DirectPathfinder, Obstacle, ObstacleMap};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Run the tickforge arena demo", long_about = None)]
struct Args {
    /// TOML config with `[sim]` and `[arena]` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent templates CSV (defaults to the built-in set)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Override `sim.total_ticks`
    #[arg(long)]
    ticks: Option<u64>,

    /// Override `sim.seed`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pace ticks against the wall clock instead of stepping back to back
    #[arg(long)]
    realtime: bool,

    /// Directory for `deltas.jsonl` and `tick_summaries.csv`
    #[arg(short, long, default_value = "output/arena")]
    out: PathBuf,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

// ── Config file ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ArenaFile {
    sim:   SimConfig,
    arena: ArenaConfig,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct ArenaConfig {
    players:             u32,
    /// Radius of the circle players run around.
    player_orbit:        f32,
    waves:               u32,
    wave_size:           u32,
    wave_interval_ticks: u64,
    /// Agents appear on a ring of this radius.
    spawn_radius:        f32,
    /// `[min_x, min_y, max_x, max_y]`
    obstacles:           Vec<[f32; 4]>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            players:             3,
            player_orbit:        250.0,
            waves:               4,
            wave_size:           6,
            wave_interval_ticks: 100,
            spawn_radius:        700.0,
            obstacles:           Vec::new(),
        }
    }
}

const DEFAULT_TEMPLATES: &str = "\
kind,behavior,max_health,speed,attack_range,detection_range,attack_damage,attack_cooldown_ticks,armor,width,height,base_priority,abilities\n\
grunt,melee,120,110,40,650,12,10,2,32,32,10,charge\n\
archer,ranged,70,90,260,800,8,14,0,28,28,12,\n\
swarmling,swarm,30,160,24,500,4,6,0,16,16,6,\n\
";

fn load_config(args: &Args) -> Result<ArenaFile> {
    let mut file = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ArenaFile::default(),
    };
    if let Some(ticks) = args.ticks {
        file.sim.total_ticks = Some(ticks);
    }
    if let Some(seed) = args.seed {
        file.sim.seed = seed;
    }
    Ok(file)
}

fn load_templates(path: Option<&Path>) -> Result<TemplateSet> {
    let set = match path {
        Some(p) => load_templates_csv(p).with_context(|| format!("loading templates {}", p.display()))?,
        None => load_templates_reader(Cursor::new(DEFAULT_TEMPLATES))?,
    };
    Ok(set)
}

// ── Scenario tasks ────────────────────────────────────────────────────────────

const FIRST_PLAYER: u32 = 1;

fn orbit_position(radius: f32, angle: f32) -> Vec2 {
    Vec2::from_angle(angle) * radius
}

/// Players run around the arena, one step per tick.
fn schedule_players(world: &mut World, tasks: &mut tf_schedule::TaskQueue<World>, arena: &ArenaConfig) {
    let count = arena.players;
    let radius = arena.player_orbit;
    let phase = move |i: u32| TAU * i as f32 / count.max(1) as f32;

    for i in 0..count {
        world.upsert_external(ExternalEntity::player(EntityId(FIRST_PLAYER + i), orbit_position(radius, phase(i))));
    }

    let mut angle = 0.0_f32;
    tasks.schedule_repeating_task(
        move |w: &mut World| {
            angle = (angle + 0.01) % TAU;
            for i in 0..count {
                w.move_external(EntityId(FIRST_PLAYER + i), orbit_position(radius, angle + phase(i)));
            }
            Ok(())
        },
        1,
        Some(1),
        TaskPriority::High,
    );
}

/// One one-shot task per wave.  Kinds cycle through the template set.
fn schedule_waves(tasks: &mut tf_schedule::TaskQueue<World>, arena: &ArenaConfig, kinds: &[String], seed: u64) {
    let mut rng = SimRng::new(seed);
    for wave in 0..arena.waves {
        let mut wave_rng = rng.child(wave as u64);
        let kinds = kinds.to_vec();
        let size = arena.wave_size;
        let radius = arena.spawn_radius;
        let level = wave + 1;
        tasks.schedule_task(
            move |w: &mut World| {
                for n in 0..size {
                    let kind = &kinds[n as usize % kinds.len()];
                    let position = wave_rng.point_on_ring(Vec2::ZERO, radius);
                    w.spawn(kind, level, position).map_err(|e| Fault::failed(e.to_string()))?;
                }
                info!(wave, size, level, "wave spawned");
                Ok(())
            },
            TaskPriority::Normal,
            1 + wave as u64 * arena.wave_interval_ticks,
        );
    }
}

/// Periodic CRITICAL maintenance: keeps running via the wall-clock sweep even
/// when the tick loop falls behind.
fn schedule_maintenance(tasks: &mut tf_schedule::TaskQueue<World>) {
    tasks.schedule_repeating_task(
        |w: &mut World| {
            debug!(
                agents = w.directory.len(),
                handles = w.directory.handle_count(),
                bodies = w.physics.body_count(),
                "maintenance"
            );
            Ok(())
        },
        20,
        None,
        TaskPriority::Critical,
    );
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let file = load_config(&args)?;
    let templates = load_templates(args.templates.as_deref())?;
    let kinds: Vec<String> = templates.iter().map(|t| t.kind.clone()).collect();
    info!(kinds = ?kinds, "templates loaded");

    let obstacles = ObstacleMap::new(
        file.arena
            .obstacles
            .iter()
            .map(|&[x0, y0, x1, y1]| Obstacle::new(Vec2::new(x0, y0), Vec2::new(x1, y1)))
            .collect(),
    );

    let ledger = DamageLedger::new();
    let mut sim = SimBuilder::new(file.sim.clone(), templates)
        .pathfinder(DirectPathfinder::new(obstacles))
        .damage_sink(ledger.clone())
        .build()?;

    // Scenario.
    schedule_players(&mut sim.world, &mut sim.tasks, &file.arena);
    schedule_waves(&mut sim.tasks, &file.arena, &kinds, file.sim.seed);
    schedule_maintenance(&mut sim.tasks);

    let deaths = Rc::new(Cell::new(0_u32));
    let counter = deaths.clone();
    sim.events.subscribe(EventKind::AgentDied, 0, move |_| counter.set(counter.get() + 1));
    sim.events.subscribe(EventKind::AbilityUsed, 0, |e| {
        if let SimEvent::AbilityUsed { agent, ability } = e {
            debug!(%agent, ability, "ability used");
        }
    });

    // Output.
    std::fs::create_dir_all(&args.out).with_context(|| format!("creating {}", args.out.display()))?;
    let sink = JsonLinesSink::create(&args.out.join("deltas.jsonl"))?;
    let diagnostics = File::create(args.out.join("tick_summaries.csv"))?;
    let mut obs = PublishObserver::new(sink).with_diagnostics(diagnostics)?;

    // Run.
    let t0 = Instant::now();
    if args.realtime {
        let mut scheduler = sim.make_scheduler(SystemClock::new())?;
        let sweep = sim.make_sweep();
        let stats = sim.run_realtime(&mut scheduler, &sweep, &mut obs)?;
        info!(
            ticks = stats.ticks,
            overruns = stats.overruns,
            max_step_us = stats.max_step.as_micros() as u64,
            "real-time run finished"
        );
    } else {
        sim.run(&mut obs);
    }
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        warn!(err = %e, "output error");
    }
    let published = obs.published();

    // Final state for late joiners.
    let mut sink = obs.into_sink();
    sink.write_snapshot(sim.clock.current_tick, &sim.full_snapshot())?;
    sink.flush()?;

    println!("Simulation finished in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks          : {}", sim.clock.current_tick.0);
    println!("  batches        : {published}");
    println!("  agents alive   : {}", sim.world.directory.len());
    println!("  agents died    : {}", deaths.get());
    println!();
    println!("{:<10} {:>12}", "Player", "Damage taken");
    println!("{}", "-".repeat(23));
    for i in 0..file.arena.players {
        let id = EntityId(FIRST_PLAYER + i);
        println!("{:<10} {:>12.1}", id.0, ledger.total_for(id));
    }

    Ok(())
}
