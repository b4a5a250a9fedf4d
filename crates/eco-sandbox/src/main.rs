//! Headless host for the ecosystem simulation.
//!
//! Stands in for the game client: feeds frame time, polls the tick, fires
//! abilities and stops when a living species dies out.

mod telemetry;

use anyhow::Result;
use clap::Parser;
use eco_core::SimConfig;
use eco_world::abilities::RainOfPlants;
use eco_world::{Advance, Simulation, Species};
use std::path::PathBuf;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "eco-sandbox")]
#[command(about = "Run the ecosystem simulation without a renderer")]
struct Args {
    /// JSON configuration file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Host frame interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Tick period in milliseconds, overriding the configuration
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Rain grass for this many ticks at the start of the session
    #[arg(long)]
    rain: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json)?;

    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(tick_ms) = args.tick_ms {
        config.clock.tick_period_ms = tick_ms;
    }

    info!(
        width = config.world.width,
        height = config.world.height,
        seed = ?config.seed,
        tick_period_ms = config.clock.tick_period_ms,
        "Starting eco-sandbox"
    );

    let mut sim = Simulation::new(config)?;
    sim.seed_population();

    let mut rain = args
        .rain
        .map(|ticks| RainOfPlants::new(Species::Grass, 10, ticks));

    let frame_delta = Duration::from_millis(args.frame_ms.max(1));
    let mut frames = interval(frame_delta);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frames.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }

        sim.frame(frame_delta);
        let Advance::Completed { tick, .. } = sim.advance() else {
            continue;
        };

        if let Some(rain) = rain.as_mut() {
            let (grid, rng) = sim.grid_and_rng();
            rain.on_tick(grid, rng);
        }

        if let Some(species) = sim.extinct_healthy_species() {
            warn!(tick, species = %species, "Game over: a species died out");
            break;
        }
        if tick >= args.ticks {
            info!(tick, "Tick limit reached");
            break;
        }
    }

    for (species, count) in sim.grid().population().iter() {
        info!(species = %species, count, "Final population");
    }
    Ok(())
}
