//! Per-leg forward simulation of a speed schedule against observed weather.
//!
//! Given any tier's schedule, this walks the route leg by leg, inverting
//! the physics model to find the still-water speed that should produce the
//! planner's target speed-over-ground, clamping to engine limits, and
//! accumulating fuel, time, and a detached time-series.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use voyage_physics::{ShipParameters, Weather, fuel_consumption_rate, inverse_sws_from_sog, speed_over_ground};
use voyage_schedule::{ScheduleEntry, ScheduleKey, SimulatedOutcome, TimeSeriesRow};
use voyage_store::{NodeMetadata, WeatherRow};

/// A clamp is considered a violation when it changes the required
/// still-water speed by more than this many knots.
const VIOLATION_THRESHOLD_KNOTS: f64 = 0.01;
/// Floor applied to achieved SOG so leg time never divides by zero.
const MIN_ACHIEVED_SOG_KNOTS: f64 = 0.1;

/// Failure modes of the simulator. All of them are caller-input problems;
/// the simulator never fails on bad weather data (that is recovered, see
/// [`SimulatedOutcome::sws_violations`] and the missing-weather debug logs).
#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("route must have at least two nodes to simulate a leg")]
    EmptyRoute,
    #[error("no schedule entry found for node {node_id} (segment {segment})")]
    MissingScheduleEntry { node_id: u32, segment: u32 },
}

/// Run the forward simulation for one sample hour's observed weather.
///
/// `nodes` must be sorted by ascending `node_id` and cover a contiguous
/// route from 0 to N-1. `weather_by_node` may be sparse; missing entries
/// fall back to calm weather (logged at debug).
pub fn simulate_voyage(
    nodes: &[NodeMetadata],
    weather_by_node: &HashMap<u32, WeatherRow>,
    schedule: &[ScheduleEntry],
    ship: &ShipParameters,
    eta_hours: f64,
) -> Result<SimulatedOutcome, SimulateError> {
    if nodes.len() < 2 {
        return Err(SimulateError::EmptyRoute);
    }

    let schedule_by_key: HashMap<ScheduleKey, &ScheduleEntry> =
        schedule.iter().map(|entry| (entry.key(), entry)).collect();

    let mut rows = Vec::with_capacity(nodes.len() - 1);
    let mut total_fuel_kg = 0.0;
    let mut total_time_h = 0.0;
    let mut sws_violations = 0;
    let mut speed_changes = 0;
    let mut previous_target_sog: Option<f64> = None;

    for window in nodes.windows(2) {
        let [a, b] = window else { unreachable!() };

        let distance_nm = b.cumulative_distance_nm - a.cumulative_distance_nm;
        if distance_nm <= 0.0 {
            continue;
        }

        let heading_deg = voyage_core::geo::bearing_deg(a.lat, a.lon, b.lat, b.lon);

        let entry = schedule_by_key
            .get(&ScheduleKey::Node(a.node_id))
            .or_else(|| schedule_by_key.get(&ScheduleKey::Segment(a.segment)))
            .ok_or(SimulateError::MissingScheduleEntry { node_id: a.node_id, segment: a.segment })?;

        let target_sog = entry.target_sog_knots;

        let weather = match weather_by_node.get(&a.node_id) {
            Some(row) => Weather::from(*row),
            None => {
                debug!(node_id = a.node_id, "no observed weather for node, using calm defaults");
                Weather::calm()
            }
        };

        let required_sws = inverse_sws_from_sog(target_sog, &weather, heading_deg, ship);
        let clamped_sws = ship.clamp_speed(required_sws);
        if (clamped_sws - required_sws).abs() > VIOLATION_THRESHOLD_KNOTS {
            sws_violations += 1;
            warn!(
                node_id = a.node_id,
                required_sws, clamped_sws, target_sog, "still-water speed clamped to engine limits"
            );
        }

        let achieved_sog = speed_over_ground(clamped_sws, &weather, heading_deg, ship).max(MIN_ACHIEVED_SOG_KNOTS);
        let time_h = distance_nm / achieved_sog;
        let fuel_kg = fuel_consumption_rate(clamped_sws) * time_h;

        total_fuel_kg += fuel_kg;
        total_time_h += time_h;

        if let Some(previous) = previous_target_sog {
            if (previous - target_sog).abs() > f64::EPSILON {
                speed_changes += 1;
            }
        }
        previous_target_sog = Some(target_sog);

        rows.push(TimeSeriesRow {
            node_id: a.node_id,
            segment: a.segment,
            lat: a.lat,
            lon: a.lon,
            planned_sog_knots: target_sog,
            actual_sog_knots: achieved_sog,
            planned_sws_knots: entry.reference_sws_knots,
            actual_sws_knots: clamped_sws,
            distance_nm,
            time_h,
            fuel_kg,
            cum_distance_nm: b.cumulative_distance_nm,
            cum_time_h: total_time_h,
            cum_fuel_kg: total_fuel_kg,
            beaufort: weather.beaufort,
            wave_height_m: weather.wave_height_m,
            current_knots: weather.current_speed_knots(),
            heading_deg,
        });
    }

    Ok(SimulatedOutcome {
        total_fuel_kg,
        total_time_h,
        arrival_deviation_h: total_time_h - eta_hours,
        speed_changes,
        co2_emissions_kg: voyage_physics::co2_emissions_kg(total_fuel_kg),
        sws_violations,
        time_series: rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_route(distance_nm: f64) -> Vec<NodeMetadata> {
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
                lon: distance_nm / 60.0,
                name: "destination".to_string(),
                is_original: true,
                cumulative_distance_nm: distance_nm,
                segment: 0,
            },
        ]
    }

    fn calm_weather(node_id: u32) -> (u32, WeatherRow) {
        (
            node_id,
            WeatherRow {
                node_id,
                sample_hour: 0,
                wind_speed_kmh: 0.0,
                wind_direction_deg: 0.0,
                beaufort: 0,
                wave_height_m: 0.0,
                current_speed_kmh: 0.0,
                current_direction_deg: 0.0,
            },
        )
    }

    #[test]
    fn scenario_a_calm_water_single_segment() {
        let nodes = two_node_route(100.0);
        let weather = HashMap::from([calm_weather(0)]);
        let ship = ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() };
        let schedule = vec![ScheduleEntry {
            leg_index: 0,
            node_id: None,
            segment: Some(0),
            target_sog_knots: 10.0,
            reference_sws_knots: 10.0,
            distance_nm: 100.0,
            time_h: 10.0,
            fuel_kg: 7.06,
        }];

        let outcome = simulate_voyage(&nodes, &weather, &schedule, &ship, 10.0).unwrap();
        assert!((outcome.total_time_h - 10.0).abs() < 1e-6);
        assert!((outcome.total_fuel_kg - 7.06).abs() < 1e-3, "got {}", outcome.total_fuel_kg);
        assert_eq!(outcome.sws_violations, 0);
    }

    #[test]
    fn clamped_schedule_reports_violations() {
        let nodes = two_node_route(50.0);
        let mut weather_row = calm_weather(0).1;
        weather_row.wind_speed_kmh = 3.6 * 25.0;
        weather_row.beaufort = 9;
        weather_row.wind_direction_deg = 180.0;
        let weather = HashMap::from([(0u32, weather_row)]);
        let ship = ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() };
        let schedule = vec![ScheduleEntry {
            leg_index: 0,
            node_id: Some(0),
            segment: None,
            target_sog_knots: 20.0,
            reference_sws_knots: 15.0,
            distance_nm: 50.0,
            time_h: 2.5,
            fuel_kg: 0.0,
        }];

        let outcome = simulate_voyage(&nodes, &weather, &schedule, &ship, 3.0).unwrap();
        assert!(outcome.sws_violations >= 1);
        assert!(outcome.time_series[0].actual_sog_knots < 20.0);
    }

    #[test]
    fn missing_route_returns_empty_route_error() {
        let nodes = vec![two_node_route(100.0)[0].clone()];
        let result = simulate_voyage(&nodes, &HashMap::new(), &[], &ShipParameters::reference(), 10.0);
        assert!(matches!(result, Err(SimulateError::EmptyRoute)));
    }
}
