#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for running Cavern Defence maps headlessly.

mod config;
mod map_transfer;
mod maps;
mod simulation;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use cavern_defence_system_pathfinding::{self as pathfinding, PathFinder};
use cavern_defence_world::{query, World, DEFAULT_GRID_SIZE};
use clap::{Args, Parser, Subcommand};
use config::{CostChoice, EnemyChoice, SimulationConfig};
use maps::ExportFormat;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cavern-defence",
    version,
    about = "Simulate, inspect and export Cavern Defence maps"
)]
struct Cli {
    /// Log filter such as `debug` or `cavern_defence_system_enemies=trace`.
    /// Falls back to `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// JSON map or share code file to load.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Edge length of the generated grid when no map is given.
    #[arg(long)]
    grid_size: Option<u32>,
}

impl MapArgs {
    fn load(&self, fallback_size: u32) -> Result<World> {
        maps::load_world(self.map.as_deref(), self.grid_size.unwrap_or(fallback_size))
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    map: MapArgs,
    /// TOML file with simulation settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for spawner selection.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to run.
    #[arg(long)]
    ticks: Option<u32>,
    /// Simulated seconds per tick.
    #[arg(long)]
    tick_seconds: Option<f32>,
    /// Ticks between consecutive spawns.
    #[arg(long)]
    spawn_interval: Option<u32>,
    /// Kinds of enemy to spawn.
    #[arg(long, value_enum)]
    enemy: Option<EnemyChoice>,
    /// Edge weighting for routes.
    #[arg(long, value_enum)]
    cost_model: Option<CostChoice>,
}

impl SimulateArgs {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(grid_size) = self.map.grid_size {
            config.grid_size = grid_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(tick_seconds) = self.tick_seconds {
            config.tick_seconds = tick_seconds;
        }
        if let Some(spawn_interval) = self.spawn_interval {
            config.spawn_interval = spawn_interval;
        }
        if let Some(enemy) = self.enemy {
            config.enemy = enemy;
        }
        if let Some(cost_model) = self.cost_model {
            config.cost_model = cost_model;
        }
        config.validate().context("invalid simulation settings")?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct RouteArgs {
    #[command(flatten)]
    map: MapArgs,
    /// Edge weighting for the route.
    #[arg(long, value_enum, default_value_t = CostChoice::Uniform)]
    cost_model: CostChoice,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    map: MapArgs,
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
    /// File to write; prints to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spawn enemies on a timer and tick the simulation headlessly.
    Simulate(SimulateArgs),
    /// Print the route from the spawn point to the exit.
    Route(RouteArgs),
    /// Write the map as JSON or as a share code.
    Export(ExportArgs),
}

/// Entry point for the Cavern Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Command::Simulate(args) => simulate(&args),
        Command::Route(args) => route(&args),
        Command::Export(args) => export(&args),
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let world = args.map.load(config.grid_size)?;
    info!(
        grid_size = query::grid_size(&world),
        ticks = config.ticks,
        seed = config.seed,
        "starting simulation"
    );

    let report = simulation::run(&world, &config);
    println!(
        "simulated {:.2}s: spawned {}, rejected {}, escaped {}, still walking {}",
        report.elapsed_seconds,
        report.spawned,
        report.rejected,
        report.escaped,
        report.remaining
    );
    Ok(())
}

fn route(args: &RouteArgs) -> Result<()> {
    let world = args.map.load(DEFAULT_GRID_SIZE)?;
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let mut pathfinder = PathFinder::new(pathfinding::Config::new(args.cost_model.into()));

    let route = pathfinder.find_path(&query::navigation(&world), start, end);
    if route.is_empty() {
        bail!(
            "no route connects the spawn point ({}, {}) to the exit ({}, {})",
            start.column(),
            start.row(),
            end.column(),
            end.row()
        );
    }

    println!("{} nodes", route.len());
    for cell in route.nodes() {
        println!("{},{}", cell.column(), cell.row());
    }
    Ok(())
}

fn export(args: &ExportArgs) -> Result<()> {
    let world = args.map.load(DEFAULT_GRID_SIZE)?;
    let rendered = maps::render(&world, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write map to {}", path.display()))?;
            info!(path = %path.display(), format = ?args.format, "map exported");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
