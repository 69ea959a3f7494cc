//! Fuel-minimal speed scheduling for a fixed maritime route under
//! time-varying weather: physics kernel, weather store, three optimization
//! tiers, forward simulator, and the result/export contract, tied together
//! into one per-tier pipeline.

pub use voyage_config as config;
pub use voyage_core as core;
pub use voyage_export as export;
pub use voyage_import as import;
pub use voyage_optimize as optimize;
pub use voyage_physics as physics;
pub use voyage_schedule as schedule;
pub use voyage_simulate as simulate;
pub use voyage_store as store;

use std::collections::HashMap;

use thiserror::Error;

use voyage_config::{ExperimentConfig, NodesMode, WeatherSource};
use voyage_optimize::{OptimizeError, WeatherGrid, build_legs, build_segments};
use voyage_schedule::{PlannedOutcome, SimulatedOutcome, VoyageMetrics, VoyageResult};
use voyage_simulate::SimulateError;
use voyage_store::{NodeMetadata, PredictedWeatherRow, StoreError, WeatherStore};

/// Errors that can surface from a full tier run (transform through
/// metrics), aggregating each stage's own error type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    #[error(transparent)]
    Simulate(#[from] SimulateError),
}

/// Run the static-LP tier end to end: read the store, solve the LP, then
/// simulate the chosen schedule against observed weather and compute
/// metrics.
pub fn run_static_lp(config: &ExperimentConfig, store: &WeatherStore) -> Result<VoyageResult, PipelineError> {
    let ship = config.ship.to_ship_parameters();
    let nodes = store.read_metadata()?;
    let attrs = store.read_attrs()?;

    let sample_hour = config.static_det.weather_snapshot;
    let weather_rows = store.read_actual(Some(sample_hour), None)?;
    let weather_by_node: HashMap<u32, _> = weather_rows.iter().map(|r| (r.node_id, *r)).collect();

    let segments = build_segments(&nodes, &weather_by_node);
    voyage_optimize::check_segment_count(segments.len(), config.static_det.segments)?;
    let planned = voyage_optimize::solve_static_lp(
        &segments,
        &ship,
        config.static_det.speed_choices,
        config.ship.eta_hours,
        &config.static_det.optimizer,
    )?;

    let simulated = voyage_simulate::simulate_voyage(&nodes, &weather_by_node, &planned.schedule, &ship, config.ship.eta_hours)?;

    Ok(finish_result("static_lp", config, &planned, simulated, attrs.total_distance_nm))
}

/// Build the weather grid a dynamic tier solves against for one sample
/// hour, honoring `dynamic_det.weather_source` (predicted forecasts, or a
/// single-shot grid built from that hour's observed weather) and
/// `dynamic_det.max_forecast_horizon`.
fn build_dynamic_weather_grid(
    config: &ExperimentConfig,
    store: &WeatherStore,
    sample_hour: i64,
) -> Result<WeatherGrid, PipelineError> {
    let rows = match config.dynamic_det.weather_source {
        WeatherSource::Predicted => store.read_predicted(Some(sample_hour), None, None)?,
        WeatherSource::Actual => store
            .read_actual(Some(sample_hour), None)?
            .into_iter()
            .map(|r| PredictedWeatherRow {
                node_id: r.node_id,
                forecast_hour: 0,
                sample_hour: r.sample_hour,
                wind_speed_kmh: r.wind_speed_kmh,
                wind_direction_deg: r.wind_direction_deg,
                beaufort: r.beaufort,
                wave_height_m: r.wave_height_m,
                current_speed_kmh: r.current_speed_kmh,
                current_direction_deg: r.current_direction_deg,
            })
            .collect(),
    };
    Ok(WeatherGrid::build(&rows, config.dynamic_det.max_forecast_horizon))
}

/// Apply `dynamic_det.nodes`: restrict the route to original waypoints
/// only, or keep every node.
fn routing_nodes(config: &ExperimentConfig, nodes: Vec<NodeMetadata>) -> Vec<NodeMetadata> {
    match config.dynamic_det.nodes {
        NodesMode::All => nodes,
        NodesMode::Original => nodes.into_iter().filter(|n| n.is_original).collect(),
    }
}

/// Run the dynamic-DP tier end to end.
pub fn run_dynamic_dp(config: &ExperimentConfig, store: &WeatherStore) -> Result<VoyageResult, PipelineError> {
    let ship = config.ship.to_ship_parameters();
    let attrs = store.read_attrs()?;
    let nodes = routing_nodes(config, store.read_metadata()?);

    let legs = build_legs(&nodes);
    let sample_hour = config.dynamic_det.forecast_origin;
    let weather_grid = build_dynamic_weather_grid(config, store, sample_hour)?;

    let planned = voyage_optimize::solve_dynamic_dp(
        &legs,
        &weather_grid,
        &ship,
        config.dynamic_det.speed_granularity,
        config.ship.eta_hours,
        config.dynamic_det.time_granularity,
        0.0,
    )?;

    let weather_rows = store.read_actual(Some(sample_hour), None)?;
    let weather_by_node: HashMap<u32, _> = weather_rows.iter().map(|r| (r.node_id, *r)).collect();
    let simulated = voyage_simulate::simulate_voyage(&nodes, &weather_by_node, &planned.schedule, &ship, config.ship.eta_hours)?;

    Ok(finish_result("dynamic_det", config, &planned, simulated, attrs.total_distance_nm))
}

/// Run the rolling-horizon tier end to end.
pub fn run_rolling_horizon(config: &ExperimentConfig, store: &WeatherStore) -> Result<VoyageResult, PipelineError> {
    let ship = config.ship.to_ship_parameters();
    let attrs = store.read_attrs()?;
    let nodes = routing_nodes(config, store.read_metadata()?);

    let legs = build_legs(&nodes);
    let all_predicted = match config.dynamic_det.weather_source {
        WeatherSource::Predicted => store.read_predicted(None, None, None)?,
        WeatherSource::Actual => store
            .read_actual(None, None)?
            .into_iter()
            .map(|r| PredictedWeatherRow {
                node_id: r.node_id,
                forecast_hour: 0,
                sample_hour: r.sample_hour,
                wind_speed_kmh: r.wind_speed_kmh,
                wind_direction_deg: r.wind_direction_deg,
                beaufort: r.beaufort,
                wave_height_m: r.wave_height_m,
                current_speed_kmh: r.current_speed_kmh,
                current_direction_deg: r.current_direction_deg,
            })
            .collect(),
    };
    let mut by_sample_hour: HashMap<i64, Vec<PredictedWeatherRow>> = HashMap::new();
    for row in all_predicted {
        by_sample_hour.entry(row.sample_hour).or_default().push(row);
    }
    let grids: HashMap<i64, WeatherGrid> = by_sample_hour
        .into_iter()
        .map(|(hour, rows)| (hour, WeatherGrid::build(&rows, config.dynamic_det.max_forecast_horizon)))
        .collect();

    let outcome = voyage_optimize::solve_rolling_horizon(
        &legs,
        &grids,
        &ship,
        config.dynamic_det.speed_granularity,
        config.ship.eta_hours,
        config.dynamic_det.time_granularity,
        config.dynamic_rh.replan_frequency_hours,
    )?;
    tracing::debug!(epochs = outcome.decision_log.len(), "rolling-horizon decision log");

    let weather_rows = store.read_actual(Some(0), None)?;
    let weather_by_node: HashMap<u32, _> = weather_rows.iter().map(|r| (r.node_id, *r)).collect();
    let simulated =
        voyage_simulate::simulate_voyage(&nodes, &weather_by_node, &outcome.planned.schedule, &ship, config.ship.eta_hours)?;

    Ok(finish_result("dynamic_rh", config, &outcome.planned, simulated, attrs.total_distance_nm))
}

fn finish_result(
    approach: &str,
    config: &ExperimentConfig,
    planned: &PlannedOutcome,
    simulated: SimulatedOutcome,
    total_distance_nm: f64,
) -> VoyageResult {
    let metrics = VoyageMetrics::compute(planned.total_fuel_kg, simulated.total_fuel_kg, simulated.total_time_h, total_distance_nm);
    let config_snapshot = serde_json::json!({
        "ship": {
            "speed_range_knots": config.ship.speed_range_knots,
            "eta_hours": config.ship.eta_hours,
        },
        "approach": approach,
    });

    VoyageResult {
        approach: approach.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        config_snapshot,
        planned: planned.clone(),
        simulated,
        metrics,
        time_series_file: format!("{approach}_time_series.csv"),
    }
}
