//! End-to-end scenarios from the result-record contract: following current
//! reduces fuel, head weather elevates it, the rolling-horizon driver
//! converges on a direct DP call under stationary weather, and engine
//! clamping is visible as a violation count.

use std::collections::HashMap;

use voyage_optimize::{WeatherGrid, build_legs, build_segments, solve_dynamic_dp, solve_rolling_horizon};
use voyage_physics::ShipParameters;
use voyage_store::{NodeMetadata, PredictedWeatherRow, WeatherRow};

fn two_node_route() -> Vec<NodeMetadata> {
    vec![
        NodeMetadata {
            node_id: 0,
            lat: 0.0,
            lon: 0.0,
            name: "origin".to_string(),
            is_original: true,
            cumulative_distance_nm: 0.0,
            segment: 0,
        },
        NodeMetadata {
            node_id: 1,
            lat: 0.0,
            lon: 1.0,
            name: "destination".to_string(),
            is_original: true,
            cumulative_distance_nm: 100.0,
            segment: 0,
        },
    ]
}

fn reference_ship() -> ShipParameters {
    ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() }
}

#[test]
fn following_current_reduces_planned_fuel() {
    let nodes = two_node_route();
    let ship = reference_ship();
    let heading = voyage_core::geo::bearing_deg(0.0, 0.0, 0.0, 1.0);

    let calm_weather = HashMap::new();
    let calm_segments = build_segments(&nodes, &calm_weather);
    let calm_plan = voyage_optimize::solve_static_lp(&calm_segments, &ship, 78, 10.0, "cbc").unwrap();

    let mut current_weather = HashMap::new();
    current_weather.insert(
        0,
        WeatherRow {
            node_id: 0,
            sample_hour: 0,
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 3.704,
            current_direction_deg: heading,
        },
    );
    let current_segments = build_segments(&nodes, &current_weather);
    let current_plan = voyage_optimize::solve_static_lp(&current_segments, &ship, 78, 10.0, "cbc").unwrap();

    assert!(
        current_plan.total_fuel_kg < calm_plan.total_fuel_kg,
        "following current ({}) should burn less than calm water ({})",
        current_plan.total_fuel_kg,
        calm_plan.total_fuel_kg
    );
}

#[test]
fn head_weather_elevates_simulated_fuel() {
    let nodes = two_node_route();
    let ship = reference_ship();
    let heading = voyage_core::geo::bearing_deg(0.0, 0.0, 0.0, 1.0);

    let calm_weather = HashMap::new();
    let calm_segments = build_segments(&nodes, &calm_weather);
    let calm_plan = voyage_optimize::solve_static_lp(&calm_segments, &ship, 78, 10.0, "cbc").unwrap();

    let mut head_weather = HashMap::new();
    head_weather.insert(
        0,
        WeatherRow {
            node_id: 0,
            sample_hour: 0,
            wind_speed_kmh: 43.2, // Beaufort 6
            wind_direction_deg: (heading + 180.0) % 360.0,
            beaufort: 6,
            wave_height_m: 3.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
    );
    let head_segments = build_segments(&nodes, &head_weather);
    let head_plan = voyage_optimize::solve_static_lp(&head_segments, &ship, 78, 10.0, "cbc").unwrap();

    let simulated = voyage_simulate::simulate_voyage(&nodes, &head_weather, &head_plan.schedule, &ship, 10.0).unwrap();
    let calm_simulated =
        voyage_simulate::simulate_voyage(&nodes, &calm_weather, &calm_plan.schedule, &ship, 10.0).unwrap();

    assert!(
        simulated.total_fuel_kg > calm_simulated.total_fuel_kg,
        "head weather fuel ({}) should exceed calm fuel ({})",
        simulated.total_fuel_kg,
        calm_simulated.total_fuel_kg
    );
}

#[test]
fn engine_clamp_is_counted_as_a_violation() {
    use voyage_schedule::ScheduleEntry;

    let nodes = two_node_route();
    let ship = reference_ship();
    let heading = voyage_core::geo::bearing_deg(0.0, 0.0, 0.0, 1.0);

    let mut weather_by_node = HashMap::new();
    weather_by_node.insert(
        0,
        WeatherRow {
            node_id: 0,
            sample_hour: 0,
            wind_speed_kmh: 100.0, // severe, far past Beaufort 10
            wind_direction_deg: (heading + 180.0) % 360.0,
            beaufort: 11,
            wave_height_m: 8.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
    );

    // Ask for an unreachable 20-knot target under this weather; inverse-SWS
    // will saturate the bracket and the clamp to [10, 15] must trigger.
    let schedule = vec![ScheduleEntry {
        leg_index: 0,
        node_id: Some(0),
        segment: None,
        target_sog_knots: 20.0,
        reference_sws_knots: 20.0,
        distance_nm: 100.0,
        time_h: 5.0,
        fuel_kg: 0.0,
    }];

    let simulated = voyage_simulate::simulate_voyage(&nodes, &weather_by_node, &schedule, &ship, 10.0).unwrap();
    assert!(simulated.sws_violations > 0, "expected at least one clamp violation");
    assert_eq!(simulated.time_series.len(), 1);
    assert!(
        simulated.time_series[0].actual_sog_knots < 20.0,
        "achieved SOG should fall short of the unreachable target"
    );
}

#[test]
fn rolling_horizon_matches_direct_dp_when_replan_frequency_covers_the_whole_voyage() {
    let nodes: Vec<NodeMetadata> = (0..10)
        .map(|i| NodeMetadata {
            node_id: i,
            lat: 0.0,
            lon: i as f64 * 0.2,
            name: format!("node_{i}"),
            is_original: i == 0 || i == 9,
            cumulative_distance_nm: i as f64 * 12.0,
            segment: 0,
        })
        .collect();
    let legs = build_legs(&nodes);
    let ship = reference_ship();

    let predicted: Vec<PredictedWeatherRow> = (0..10)
        .map(|i| PredictedWeatherRow {
            node_id: i,
            forecast_hour: 0,
            sample_hour: 0,
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        })
        .collect();
    let grid = WeatherGrid::build(&predicted, None);

    let direct = solve_dynamic_dp(&legs, &grid, &ship, 0.5, 12.0, 1.0, 0.0).unwrap();

    let mut grids = HashMap::new();
    grids.insert(0, WeatherGrid::build(&predicted, None));
    let rh = solve_rolling_horizon(&legs, &grids, &ship, 0.5, 12.0, 1.0, 12.0).unwrap();

    assert_eq!(rh.planned.solver_status, direct.solver_status);
    assert!(
        (rh.planned.total_fuel_kg - direct.total_fuel_kg).abs() < 1e-3,
        "RH fuel {} should match direct DP fuel {} when replan_frequency >= ETA",
        rh.planned.total_fuel_kg,
        direct.total_fuel_kg
    );
}

#[test]
fn rolling_horizon_matches_direct_dp_under_stationary_weather() {
    let nodes: Vec<NodeMetadata> = (0..10)
        .map(|i| NodeMetadata {
            node_id: i,
            lat: 0.0,
            lon: i as f64 * (12.0 / 9.0) / 60.0,
            name: format!("node_{i}"),
            is_original: i == 0 || i == 9,
            cumulative_distance_nm: i as f64 * (120.0 / 9.0),
            segment: 0,
        })
        .collect();
    let legs = build_legs(&nodes);
    let ship = reference_ship();

    let stationary_rows: Vec<PredictedWeatherRow> = (0..10)
        .map(|i| PredictedWeatherRow {
            node_id: i,
            forecast_hour: 0,
            sample_hour: 0,
            wind_speed_kmh: 10.0,
            wind_direction_deg: 90.0,
            beaufort: 3,
            wave_height_m: 1.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        })
        .collect();

    // Two decision-point sample hours (0 and 6) carrying identical weather:
    // the forecast never actually changes between re-plans.
    let grid_at_0 = WeatherGrid::build(&stationary_rows, None);
    let grid_at_6 = WeatherGrid::build(
        &stationary_rows.iter().map(|r| PredictedWeatherRow { sample_hour: 6, ..*r }).collect::<Vec<_>>(),
        None,
    );

    let direct = solve_dynamic_dp(&legs, &grid_at_0, &ship, 0.5, 12.0, 1.0, 0.0).unwrap();

    let mut grids = HashMap::new();
    grids.insert(0, grid_at_0);
    grids.insert(6, grid_at_6);
    let rh = solve_rolling_horizon(&legs, &grids, &ship, 0.5, 12.0, 1.0, 6.0).unwrap();

    assert_eq!(rh.decision_log.len(), 2, "expected two re-planning decision points over a 12h ETA at a 6h cadence");
    assert!(
        (rh.planned.total_fuel_kg - direct.total_fuel_kg).abs() < 1e-3,
        "RH fuel {} should match direct DP fuel {} when weather never changes between epochs",
        rh.planned.total_fuel_kg,
        direct.total_fuel_kg
    );
}

#[test]
fn infeasible_eta_reports_infeasible_at_every_tier() {
    let nodes: Vec<NodeMetadata> = vec![
        NodeMetadata {
            node_id: 0,
            lat: 0.0,
            lon: 0.0,
            name: "origin".to_string(),
            is_original: true,
            cumulative_distance_nm: 0.0,
            segment: 0,
        },
        NodeMetadata {
            node_id: 1,
            lat: 0.0,
            lon: 16.0,
            name: "destination".to_string(),
            is_original: true,
            cumulative_distance_nm: 1000.0,
            segment: 0,
        },
    ];
    let legs = build_legs(&nodes);
    let ship = ShipParameters { min_speed_knots: 8.0, max_speed_knots: 10.0, ..ShipParameters::reference() };

    let calm_weather = HashMap::new();
    let segments = build_segments(&nodes, &calm_weather);
    let lp_plan = voyage_optimize::solve_static_lp(&segments, &ship, 6, 50.0, "cbc").unwrap();
    assert_eq!(
        lp_plan.solver_status,
        voyage_schedule::SolverStatus::Infeasible,
        "1000nm at a 10kn cap cannot reach a 50h ETA"
    );

    let rows: Vec<PredictedWeatherRow> = (0..2)
        .map(|i| PredictedWeatherRow {
            node_id: i,
            forecast_hour: 0,
            sample_hour: 0,
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        })
        .collect();
    let grid = WeatherGrid::build(&rows, None);
    let dp_plan = solve_dynamic_dp(&legs, &grid, &ship, 1.0, 50.0, 1.0, 0.0).unwrap();
    assert_eq!(dp_plan.solver_status, voyage_schedule::SolverStatus::Infeasible);

    let mut grids = HashMap::new();
    grids.insert(0, WeatherGrid::build(&rows, None));
    let rh = solve_rolling_horizon(&legs, &grids, &ship, 1.0, 50.0, 1.0, 10.0).unwrap();
    assert_eq!(
        rh.planned.solver_status,
        voyage_schedule::SolverStatus::Infeasible,
        "rolling horizon should report infeasible once no sub-instance can reach the destination in time"
    );
    assert_eq!(rh.decision_log.len(), 1, "should stop at the first decision point once infeasibility is detected");
    assert_eq!(
        rh.decision_log[0].solver_status,
        voyage_schedule::SolverStatus::Infeasible,
        "the logged decision point should record the infeasibility"
    );
}

#[test]
fn single_node_route_has_no_legs_and_reports_an_empty_optimal_schedule() {
    // A one-node route has nothing to schedule: `build_legs` correctly
    // produces zero legs, and the DP reports a vacuous `Optimal` result
    // with an empty schedule and zero fuel rather than an error.
    let nodes = vec![NodeMetadata {
        node_id: 0,
        lat: 0.0,
        lon: 0.0,
        name: "only".to_string(),
        is_original: true,
        cumulative_distance_nm: 0.0,
        segment: 0,
    }];
    let legs = build_legs(&nodes);
    assert!(legs.is_empty());

    let grid = WeatherGrid::build(&[], None);
    let outcome = solve_dynamic_dp(&legs, &grid, &ShipParameters::reference(), 1.0, 10.0, 1.0, 0.0).unwrap();
    assert_eq!(outcome.solver_status, voyage_schedule::SolverStatus::Optimal);
    assert!(outcome.schedule.is_empty());
    assert_eq!(outcome.total_fuel_kg, 0.0);
}
