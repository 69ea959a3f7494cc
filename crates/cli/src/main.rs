//! Command-line entry point for the voyage optimizer.
//!
//! Every planning subcommand runs the same four stages — read the weather
//! store, solve, simulate against observed weather, compute metrics — and
//! writes the resulting JSON record and CSV time-series to the requested
//! output paths. `simulate` runs the forward simulator alone against an
//! externally supplied schedule, and `import-pickle` converts a legacy
//! pickle dump into a fresh store.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voyage_config::load_experiment_config;
use voyage_export::{write_result_json, write_time_series_csv};
use voyage_schedule::ScheduleEntry;
use voyage_store::WeatherStore;

#[derive(Parser)]
#[command(name = "voyage", version, about = "Fuel-minimal speed scheduling for fixed maritime routes")]
struct Cli {
    /// Increase log verbosity; repeat for more detail (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the static mixed-integer speed schedule against a single weather snapshot.
    StaticLp(PlanArgs),
    /// Solve the dynamic deterministic schedule over the forecast lattice.
    DynamicDp(PlanArgs),
    /// Re-solve the dynamic schedule at fixed intervals as forecasts refresh.
    RollingHorizon(PlanArgs),
    /// Run the forward simulator alone against an externally supplied schedule.
    Simulate(SimulateArgs),
    /// Convert a legacy pickle weather dump into a fresh weather store.
    ImportPickle(ImportArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Path to the experiment configuration (YAML or TOML).
    #[arg(long)]
    config: PathBuf,
    /// Path to the weather store (HDF5).
    #[arg(long)]
    store: PathBuf,
    /// Output path for the JSON result record (`-` for stdout).
    #[arg(long, default_value = "result.json")]
    out_json: PathBuf,
    /// Output path for the per-leg CSV time-series (`-` for stdout).
    #[arg(long, default_value = "time_series.csv")]
    out_csv: PathBuf,
}

#[derive(Args)]
struct SimulateArgs {
    /// Path to the experiment configuration (YAML or TOML).
    #[arg(long)]
    config: PathBuf,
    /// Path to the weather store (HDF5).
    #[arg(long)]
    store: PathBuf,
    /// Path to a JSON file holding the schedule to simulate (a list of schedule entries).
    #[arg(long)]
    schedule: PathBuf,
    /// Sample hour of observed weather to simulate against.
    #[arg(long, default_value_t = 0)]
    sample_hour: i64,
    /// Output path for the JSON result record (`-` for stdout).
    #[arg(long, default_value = "simulated.json")]
    out_json: PathBuf,
    /// Output path for the per-leg CSV time-series (`-` for stdout).
    #[arg(long, default_value = "simulated_time_series.csv")]
    out_csv: PathBuf,
}

#[derive(Args)]
struct ImportArgs {
    /// Path to the legacy pickle dump.
    #[arg(long)]
    pickle: PathBuf,
    /// Path at which to create the new weather store.
    #[arg(long)]
    store: PathBuf,
    /// Name recorded as the route's global attribute.
    #[arg(long)]
    route_name: String,
    /// Path to a JSON file holding the route's original waypoints as `[lat, lon]` pairs, in order.
    #[arg(long)]
    waypoints: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::StaticLp(args) => run_plan(&args, "static_lp"),
        Commands::DynamicDp(args) => run_plan(&args, "dynamic_dp"),
        Commands::RollingHorizon(args) => run_plan(&args, "rolling_horizon"),
        Commands::Simulate(args) => run_simulate(&args),
        Commands::ImportPickle(args) => run_import(&args),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_plan(args: &PlanArgs, approach: &str) -> Result<()> {
    let config = load_experiment_config(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let store = WeatherStore::open(&args.store)
        .with_context(|| format!("opening weather store at {}", args.store.display()))?;

    let result = match approach {
        "static_lp" => voyage_optimizer::run_static_lp(&config, &store),
        "dynamic_dp" => voyage_optimizer::run_dynamic_dp(&config, &store),
        "rolling_horizon" => voyage_optimizer::run_rolling_horizon(&config, &store),
        other => unreachable!("unknown approach {other}"),
    }
    .with_context(|| format!("running {approach} pipeline"))?;

    write_time_series_csv(&args.out_csv, &result.simulated.time_series)
        .with_context(|| format!("writing time series to {}", args.out_csv.display()))?;
    write_result_json(&args.out_json, &result)
        .with_context(|| format!("writing result to {}", args.out_json.display()))?;

    tracing::info!(
        approach,
        fuel_gap_pct = result.metrics.fuel_gap_pct,
        status = ?result.planned.solver_status,
        "voyage plan complete"
    );
    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let config = load_experiment_config(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let store = WeatherStore::open(&args.store)
        .with_context(|| format!("opening weather store at {}", args.store.display()))?;

    let schedule_text = fs::read_to_string(&args.schedule)
        .with_context(|| format!("reading schedule from {}", args.schedule.display()))?;
    let schedule: Vec<ScheduleEntry> =
        serde_json::from_str(&schedule_text).context("parsing schedule JSON")?;

    let ship = config.ship.to_ship_parameters();
    let nodes = store.read_metadata().context("reading node metadata")?;
    let weather_rows =
        store.read_actual(Some(args.sample_hour), None).context("reading observed weather")?;
    let weather_by_node: std::collections::HashMap<u32, _> =
        weather_rows.iter().map(|r| (r.node_id, *r)).collect();

    let simulated =
        voyage_simulate::simulate_voyage(&nodes, &weather_by_node, &schedule, &ship, config.ship.eta_hours)
            .context("simulating schedule")?;

    write_time_series_csv(&args.out_csv, &simulated.time_series)
        .with_context(|| format!("writing time series to {}", args.out_csv.display()))?;

    let simulated_json = serde_json::json!({
        "total_fuel_kg": simulated.total_fuel_kg,
        "total_time_h": simulated.total_time_h,
        "arrival_deviation_h": simulated.arrival_deviation_h,
        "speed_changes": simulated.speed_changes,
        "co2_emissions_kg": simulated.co2_emissions_kg,
        "sws_violations": simulated.sws_violations,
    });
    voyage_export::writer_for_path(&args.out_json)
        .and_then(|w| serde_json::to_writer_pretty(w, &simulated_json).map_err(std::io::Error::from))
        .with_context(|| format!("writing result to {}", args.out_json.display()))?;

    tracing::info!(
        total_fuel_kg = simulated.total_fuel_kg,
        sws_violations = simulated.sws_violations,
        "standalone simulation complete"
    );
    Ok(())
}

fn run_import(args: &ImportArgs) -> Result<()> {
    let waypoints_text = fs::read_to_string(&args.waypoints)
        .with_context(|| format!("reading waypoints from {}", args.waypoints.display()))?;
    let waypoints: Vec<(f64, f64)> =
        serde_json::from_str(&waypoints_text).context("parsing waypoints JSON")?;

    voyage_import::import_pickle(&args.pickle, &args.store, &args.route_name, &waypoints)
        .with_context(|| format!("importing pickle dump from {}", args.pickle.display()))?;

    tracing::info!(store = %args.store.display(), "imported legacy pickle dump");
    Ok(())
}
