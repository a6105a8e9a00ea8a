//! routesync CLI - Debug tool for route preprocessing and time sync
//!
//! Usage:
//!   routesync-cli inspect <records.json> [--map <name>]
//!   routesync-cli compare <records.json> --time <seconds>
//!   routesync-cli pick <records.json> --route <id> --x <x> --y <y>
//!   routesync-cli ticks <records.json> --route <id>
//!   routesync-cli render <records.json> [--time <seconds>]
//!
//! Records are a JSON array of route records as delivered by the backend.
//! Every command loads them through the same engine the viewer uses, with a
//! recording surface standing in for the map.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use routesync::{
    EngineConfig, PrimitiveKind, RecordingSurface, Result, RouteEngine, RouteRecord, WorldPoint,
    interval_ticks, parse_records,
};

#[derive(Parser)]
#[command(name = "routesync-cli")]
#[command(about = "Debug tool for route preprocessing and time synchronization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file overriding engine configuration fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Map to load (defaults to the map of the first record)
    #[arg(short, long, global = true)]
    map: Option<String>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes with their preprocessed statistics
    Inspect {
        /// JSON file with route records
        records: PathBuf,
    },

    /// Show where every visible route is at a shared elapsed time
    Compare {
        records: PathBuf,

        /// Comparison time in seconds
        #[arg(short, long)]
        time: f64,
    },

    /// Map a point on one route to a time, then sync all routes to it
    Pick {
        records: PathBuf,

        /// Route the point was picked on
        #[arg(short, long)]
        route: String,

        #[arg(short)]
        x: f64,

        #[arg(short)]
        y: f64,
    },

    /// List the elapsed-time tick markers of a route
    Ticks {
        records: PathBuf,

        #[arg(short, long)]
        route: String,
    },

    /// Reconcile all routes against a recording surface and report primitives
    Render {
        records: PathBuf,

        /// Optional comparison time in seconds
        #[arg(short, long)]
        time: Option<f64>,
    },

    /// Render a synthetic dataset
    #[cfg(feature = "synthetic")]
    Demo {
        /// Number of synthetic routes
        #[arg(long, default_value = "10")]
        routes: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { records } => {
            let engine = load_engine(&records, cli.map.as_deref(), config)?;
            run_inspect(&engine);
        }
        Commands::Compare { records, time } => {
            let mut engine = load_engine(&records, cli.map.as_deref(), config)?;
            engine.set_comparison_time(Some(time * 1000.0));
            print_positions(&engine);
        }
        Commands::Pick { records, route, x, y } => {
            let mut engine = load_engine(&records, cli.map.as_deref(), config)?;
            match engine.select_point(&route, WorldPoint::new(x, y))? {
                Some(time) => {
                    println!("Point ({x}, {y}) on '{route}' is at T={}s", time / 1000.0);
                    print_positions(&engine);
                }
                None => println!("Route '{route}' has no segments to pick from"),
            }
        }
        Commands::Ticks { records, route } => {
            let engine = load_engine(&records, cli.map.as_deref(), config)?;
            run_ticks(&engine, &route)?;
        }
        Commands::Render { records, time } => {
            let mut engine = load_engine(&records, cli.map.as_deref(), config)?;
            if let Some(time) = time {
                engine.set_comparison_time(Some(time * 1000.0));
            }
            print_surface(&engine);
        }
        #[cfg(feature = "synthetic")]
        Commands::Demo { routes, seed } => {
            use routesync::synthetic::SyntheticScenario;

            let scenario = SyntheticScenario {
                route_count: routes,
                seed,
                world_size: config.world_size,
                ..SyntheticScenario::default()
            };
            let dataset = scenario.generate();
            println!(
                "Generated {} routes, {} samples ({} idle)",
                dataset.records.len(),
                dataset.metadata.total_samples,
                dataset.metadata.idle_samples
            );
            let mut engine = RouteEngine::new(RecordingSurface::new(), config)?;
            engine.set_map(&scenario.map, dataset.records);
            run_inspect(&engine);
            print_surface(&engine);
        }
    }
    Ok(())
}

/// Read engine configuration, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config: EngineConfig = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_records(path: &Path) -> Result<Vec<RouteRecord>> {
    println!("\n{}", "=".repeat(60));
    println!("Loading route records from: {}", path.display());
    println!("{}", "=".repeat(60));
    parse_records(&fs::read_to_string(path)?)
}

fn load_engine(
    path: &Path,
    map: Option<&str>,
    config: EngineConfig,
) -> Result<RouteEngine<RecordingSurface>> {
    let records = load_records(path)?;
    let map = map
        .map(str::to_string)
        .or_else(|| records.first().map(|r| r.map.clone()))
        .unwrap_or_default();

    let mut engine = RouteEngine::new(RecordingSurface::new(), config)?;
    engine.set_map(&map, records);
    println!("Map '{}': {} routes", map, engine.routes().len());
    Ok(engine)
}

fn run_inspect(engine: &RouteEngine<RecordingSurface>) {
    println!(
        "\n{:<24} {:<14} {:<10} {:>8} {:>10} {:>10}  colour",
        "route", "category", "vehicle", "samples", "duration", "length"
    );
    for route in engine.routes().iter() {
        let samples = route.path.as_ref().map_or(0, |p| p.len());
        println!(
            "{:<24} {:<14} {:<10} {:>8} {:>9.1}s {:>10.1}  {}",
            route.id,
            route.metadata.category,
            route.metadata.vehicle,
            samples,
            route.duration_ms() / 1000.0,
            route.length(),
            engine.palette().entry(route.color_index).enabled
        );
    }
    println!("\nCategories: {}", engine.categories().join(", "));
    println!("Vehicles:   {}", engine.vehicles().join(", "));
}

fn run_ticks(engine: &RouteEngine<RecordingSurface>, route_id: &str) -> Result<()> {
    use routesync::OptionExt;

    let route = engine.routes().get(route_id).ok_or_unknown_route(route_id)?;
    let Some(path) = route.samples() else {
        println!("Route '{route_id}' has no path");
        return Ok(());
    };
    let ticks = interval_ticks(path, engine.config().tick_interval_ms);
    println!("\n{} ticks on '{}':", ticks.len(), route_id);
    for tick in ticks {
        println!(
            "  T={:>7}s  ({:.1}, {:.1})",
            tick.time / 1000.0,
            tick.position.x,
            tick.position.y
        );
    }
    Ok(())
}

fn print_positions(engine: &RouteEngine<RecordingSurface>) {
    let Some(time) = engine.comparison_time() else {
        return;
    };
    let positions = engine.comparison_positions();
    println!(
        "\n{} of {} visible routes at T={}s:",
        positions.len(),
        engine.visible().len(),
        time / 1000.0
    );
    for synced in positions {
        let tile = engine.transform().apply(synced.position);
        println!(
            "  {:<24} world ({:.1}, {:.1})  tile ({:.2}, {:.2})",
            synced.route_id, synced.position.x, synced.position.y, tile.x, tile.y
        );
    }
}

fn print_surface(engine: &RouteEngine<RecordingSurface>) {
    let surface = engine.surface();
    println!("\nSurface for map '{}':", surface.map().unwrap_or("-"));
    println!("  segments:    {}", surface.count(PrimitiveKind::Segment));
    println!("  ticks:       {}", surface.count(PrimitiveKind::Tick));
    println!("  comparisons: {}", surface.count(PrimitiveKind::Comparison));
    println!("  operations:  {}", surface.ops().len());
}
