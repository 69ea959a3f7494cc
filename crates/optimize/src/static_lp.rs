//! Static LP tier: aggregate the route into coarse segments and solve a
//! mixed-integer speed-selection problem.

use std::collections::HashMap;
use std::time::Instant;

use good_lp::{Expression, Solution, SolverModel, constraint, variable, variables};
use tracing::info;

use voyage_core::stats::nanmean;
use voyage_physics::{ShipParameters, Weather, fuel_consumption_rate, speed_over_ground};
use voyage_schedule::{PlannedOutcome, ScheduleEntry, SolverStatus};
use voyage_store::{NodeMetadata, WeatherRow};

use crate::error::OptimizeError;
use crate::speed_grid::linspace_grid;

/// One coarse segment of the route, with its aggregated weather.
#[derive(Debug, Clone)]
pub struct SegmentInstance {
    pub segment_id: u32,
    pub heading_deg: f64,
    pub length_nm: f64,
    pub weather: Weather,
}

/// Aggregate `nodes` into per-segment instances, taking the representative
/// bearing from each segment's first to last node and averaging weather
/// (scalar fields by mean, direction fields by circular mean).
pub fn build_segments(nodes: &[NodeMetadata], weather_by_node: &HashMap<u32, WeatherRow>) -> Vec<SegmentInstance> {
    let mut by_segment: HashMap<u32, Vec<&NodeMetadata>> = HashMap::new();
    for node in nodes {
        by_segment.entry(node.segment).or_default().push(node);
    }

    let mut segment_ids: Vec<u32> = by_segment.keys().copied().collect();
    segment_ids.sort_unstable();

    segment_ids
        .into_iter()
        .map(|segment_id| {
            let mut members = by_segment.remove(&segment_id).unwrap();
            members.sort_by_key(|n| n.node_id);
            let first = members.first().unwrap();
            let last = members.last().unwrap();

            let heading_deg = voyage_core::geo::bearing_deg(first.lat, first.lon, last.lat, last.lon);
            let length_nm = last.cumulative_distance_nm - first.cumulative_distance_nm;

            let readings: Vec<WeatherRow> =
                members.iter().filter_map(|n| weather_by_node.get(&n.node_id).copied()).collect();

            let wind_speeds: Vec<f64> = readings.iter().map(|r| r.wind_speed_kmh).collect();
            let wind_dirs: Vec<f64> = readings.iter().map(|r| r.wind_direction_deg).collect();
            let waves: Vec<f64> = readings.iter().map(|r| r.wave_height_m).collect();
            let current_speeds: Vec<f64> = readings.iter().map(|r| r.current_speed_kmh).collect();
            let current_dirs: Vec<f64> = readings.iter().map(|r| r.current_direction_deg).collect();

            let wind_speed_kmh = nanmean(&wind_speeds).unwrap_or(0.0);
            let wave_height_m = nanmean(&waves).unwrap_or(0.0);
            let current_speed_kmh = nanmean(&current_speeds).unwrap_or(0.0);
            let wind_direction_deg = voyage_core::angle::circular_mean_deg(&wind_dirs).unwrap_or(0.0);
            let current_direction_deg = voyage_core::angle::circular_mean_deg(&current_dirs).unwrap_or(0.0);
            let beaufort = voyage_physics::wind_speed_to_beaufort(wind_speed_kmh);

            SegmentInstance {
                segment_id,
                heading_deg,
                length_nm,
                weather: Weather {
                    wind_speed_kmh,
                    wind_direction_deg,
                    beaufort,
                    wave_height_m,
                    current_speed_kmh,
                    current_direction_deg,
                },
            }
        })
        .collect()
}

/// Verify the route's actual segment count against `static_det.segments`,
/// the configured expectation used as a sanity check on the route data.
pub fn check_segment_count(actual: usize, expected: usize) -> Result<(), OptimizeError> {
    if actual != expected {
        return Err(OptimizeError::SegmentCountMismatch { expected, actual });
    }
    Ok(())
}

/// Solve the static LP: pick one speed per segment minimizing total fuel
/// subject to the ETA cap and per-segment SOG bounds. `optimizer` is the
/// configured solver backend tag (`static_det.optimizer`); only `"cbc"` is
/// supported, since `good_lp` is compiled against the `coin_cbc` backend.
pub fn solve_static_lp(
    segments: &[SegmentInstance],
    ship: &ShipParameters,
    speed_choices: usize,
    eta_hours: f64,
    optimizer: &str,
) -> Result<PlannedOutcome, OptimizeError> {
    if segments.is_empty() {
        return Err(OptimizeError::EmptyRoute);
    }
    if optimizer != "cbc" {
        return Err(OptimizeError::UnknownBackend(optimizer.to_string()));
    }

    let start = Instant::now();
    let speeds = linspace_grid(ship.min_speed_knots, ship.max_speed_knots, speed_choices);
    let k = speeds.len();

    // sog_table[s][ki], fcr_grid[ki]
    let sog_table: Vec<Vec<f64>> = segments
        .iter()
        .map(|seg| speeds.iter().map(|&v| speed_over_ground(v, &seg.weather, seg.heading_deg, ship)).collect())
        .collect();
    let fcr_grid: Vec<f64> = speeds.iter().map(|&v| fuel_consumption_rate(v)).collect();

    let mut vars = variables!();
    let x: Vec<Vec<_>> = segments.iter().map(|_| (0..k).map(|_| vars.add(variable().binary())).collect()).collect();

    let mut objective_terms: Vec<Expression> = Vec::new();
    let mut time_terms: Vec<Expression> = Vec::new();
    for (s, seg) in segments.iter().enumerate() {
        for ki in 0..k {
            if sog_table[s][ki] <= 0.0 {
                continue;
            }
            let coeff = seg.length_nm * fcr_grid[ki] / sog_table[s][ki];
            objective_terms.push(coeff * x[s][ki]);
            time_terms.push((seg.length_nm / sog_table[s][ki]) * x[s][ki]);
        }
    }
    let objective: Expression = objective_terms.into_iter().sum();
    let time_expr: Expression = time_terms.into_iter().sum();

    let mut model = vars.minimise(objective).using(good_lp::solvers::coin_cbc::coin_cbc);
    model = model.with(constraint!(time_expr <= eta_hours));

    for s in 0..segments.len() {
        let choose_one: Expression = (0..k).map(|ki| 1.0 * x[s][ki]).sum();
        model = model.with(constraint!(choose_one == 1.0));
    }

    for s in 0..segments.len() {
        let lower = sog_table[s].iter().cloned().fold(f64::INFINITY, f64::min);
        let upper = sog_table[s].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let sog_expr: Expression = (0..k).map(|ki| sog_table[s][ki] * x[s][ki]).sum();
        model = model.with(constraint!(sog_expr.clone() >= lower));
        model = model.with(constraint!(sog_expr <= upper));
    }

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(err) => {
            let status = match err {
                good_lp::ResolutionError::Infeasible => SolverStatus::Infeasible,
                _ => SolverStatus::Error,
            };
            info!(error = %err, ?status, "static LP did not reach optimality");
            return Ok(PlannedOutcome {
                total_fuel_kg: 0.0,
                total_time_h: 0.0,
                schedule: Vec::new(),
                solver_status: status,
                computation_time_s: start.elapsed().as_secs_f64(),
            });
        }
    };

    let mut schedule = Vec::with_capacity(segments.len());
    let mut total_fuel_kg = 0.0;
    let mut total_time_h = 0.0;

    for (s, seg) in segments.iter().enumerate() {
        let chosen_ki = (0..k)
            .find(|&ki| solution.value(x[s][ki]) > 0.5)
            .ok_or_else(|| OptimizeError::Solver(format!("segment {} has no chosen speed", seg.segment_id)))?;

        let sog = sog_table[s][chosen_ki];
        let sws = speeds[chosen_ki];
        let time_h = seg.length_nm / sog;
        let fuel_kg = fcr_grid[chosen_ki] * time_h;

        total_fuel_kg += fuel_kg;
        total_time_h += time_h;

        schedule.push(ScheduleEntry {
            leg_index: s,
            node_id: None,
            segment: Some(seg.segment_id),
            target_sog_knots: sog,
            reference_sws_knots: sws,
            distance_nm: seg.length_nm,
            time_h,
            fuel_kg,
        });
    }

    info!(total_fuel_kg, total_time_h, "static LP solved to optimality");

    Ok(PlannedOutcome {
        total_fuel_kg,
        total_time_h,
        schedule,
        solver_status: SolverStatus::Optimal,
        computation_time_s: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm_segments() -> Vec<SegmentInstance> {
        vec![SegmentInstance { segment_id: 0, heading_deg: 90.0, length_nm: 100.0, weather: Weather::calm() }]
    }

    #[test]
    fn scenario_a_picks_minimum_feasible_speed() {
        let ship = ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() };
        let outcome = solve_static_lp(&calm_segments(), &ship, 6, 10.0, "cbc").unwrap();
        assert_eq!(outcome.solver_status, SolverStatus::Optimal);
        assert!((outcome.total_time_h - 10.0).abs() < 1e-6);
        assert!((outcome.total_fuel_kg - 7.06).abs() < 1e-2, "got {}", outcome.total_fuel_kg);
    }

    #[test]
    fn infeasible_eta_reports_infeasible_or_error() {
        let ship = ShipParameters { min_speed_knots: 8.0, max_speed_knots: 10.0, ..ShipParameters::reference() };
        let mut segments = calm_segments();
        segments[0].length_nm = 1000.0;
        let outcome = solve_static_lp(&segments, &ship, 3, 50.0, "cbc").unwrap();
        assert_ne!(outcome.solver_status, SolverStatus::Optimal);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let ship = ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() };
        let result = solve_static_lp(&calm_segments(), &ship, 6, 10.0, "highs");
        assert!(matches!(result, Err(OptimizeError::UnknownBackend(backend)) if backend == "highs"));
    }

    #[test]
    fn segment_count_mismatch_is_reported() {
        let result = check_segment_count(2, 3);
        assert!(matches!(
            result,
            Err(OptimizeError::SegmentCountMismatch { expected: 3, actual: 2 })
        ));
        assert!(check_segment_count(3, 3).is_ok());
    }
}
