//! Rolling-horizon driver: repeatedly re-solves the dynamic DP over a
//! shrinking remainder of the route, committing only the legs reached
//! before the next re-planning epoch.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{info, warn};

use voyage_physics::ShipParameters;
use voyage_schedule::{DecisionPoint, PlannedOutcome, ScheduleEntry, SolverStatus};

use crate::dynamic_dp::{LegInstance, solve_dynamic_dp};
use crate::error::OptimizeError;
use crate::weather_lookup::WeatherGrid;

/// Pick the freshest available sample hour no later than `elapsed_floor`,
/// falling back to the smallest available sample hour if none qualifies.
fn pick_sample_hour(available: &[i64], elapsed_floor: i64) -> i64 {
    available
        .iter()
        .filter(|&&h| h <= elapsed_floor)
        .max()
        .copied()
        .unwrap_or_else(|| *available.iter().min().expect("at least one sample hour"))
}

/// Result of the rolling-horizon driver: the stitched global schedule plus
/// per-epoch telemetry.
pub struct RollingHorizonOutcome {
    pub planned: PlannedOutcome,
    pub decision_log: Vec<DecisionPoint>,
}

/// Run the rolling-horizon loop over `legs`, re-planning every
/// `replan_frequency_hours` using whichever of `weather_grids_by_sample_hour`
/// is freshest at each decision epoch.
pub fn solve_rolling_horizon(
    legs: &[LegInstance],
    weather_grids_by_sample_hour: &HashMap<i64, WeatherGrid>,
    ship: &ShipParameters,
    speed_granularity: f64,
    eta_hours: f64,
    delta_t_hours: f64,
    replan_frequency_hours: f64,
) -> Result<RollingHorizonOutcome, OptimizeError> {
    if legs.is_empty() {
        return Err(OptimizeError::EmptyRoute);
    }
    if weather_grids_by_sample_hour.is_empty() {
        return Err(OptimizeError::Solver("rolling horizon requires at least one sample-hour weather grid".to_string()));
    }

    let start = Instant::now();
    let available_hours: Vec<i64> = weather_grids_by_sample_hour.keys().copied().collect();
    let n = legs.len();

    let mut current_leg_idx = 0usize;
    let mut elapsed_time = 0.0f64;
    let mut elapsed_fuel = 0.0f64;
    let mut committed_schedule: Vec<ScheduleEntry> = Vec::new();
    let mut decision_log: Vec<DecisionPoint> = Vec::new();

    let mut epoch = 0usize;
    loop {
        let nominal_hour = epoch as f64 * replan_frequency_hours;
        if nominal_hour >= eta_hours || current_leg_idx >= n {
            break;
        }

        let remaining_eta = eta_hours - elapsed_time;
        if remaining_eta <= 0.0 {
            break;
        }

        let sample_hour = pick_sample_hour(&available_hours, elapsed_time.floor() as i64);
        let grid = &weather_grids_by_sample_hour[&sample_hour];
        let remaining_legs = &legs[current_leg_idx..];

        let sub_outcome =
            solve_dynamic_dp(remaining_legs, grid, ship, speed_granularity, remaining_eta, delta_t_hours, elapsed_time)?;

        if sub_outcome.solver_status == SolverStatus::Infeasible {
            warn!(epoch, nominal_hour, current_leg_idx, "rolling-horizon sub-instance infeasible, stopping");
            decision_log.push(DecisionPoint {
                nominal_hour,
                elapsed_hour: elapsed_time,
                sample_hour,
                node_index: current_leg_idx,
                legs_committed: 0,
                elapsed_fuel_kg: elapsed_fuel,
                elapsed_time_h: elapsed_time,
                solver_status: SolverStatus::Infeasible,
                planned_remaining_fuel_kg: sub_outcome.total_fuel_kg,
                planned_remaining_time_h: sub_outcome.total_time_h,
            });
            break;
        }

        let next_nominal_hour = (epoch + 1) as f64 * replan_frequency_hours;
        let is_last_epoch = next_nominal_hour >= eta_hours;
        let commit_window_hours = next_nominal_hour - nominal_hour;

        let mut legs_committed = 0usize;
        let mut cumulative_sub_time = 0.0f64;
        for entry in &sub_outcome.schedule {
            if !is_last_epoch && cumulative_sub_time >= commit_window_hours {
                break;
            }
            cumulative_sub_time += entry.time_h;
            legs_committed += 1;
        }
        if legs_committed == 0 && !sub_outcome.schedule.is_empty() {
            legs_committed = 1;
        }

        let mut epoch_fuel = 0.0;
        let mut epoch_time = 0.0;
        for entry in sub_outcome.schedule.iter().take(legs_committed) {
            let mut reindexed = *entry;
            reindexed.leg_index = current_leg_idx + entry.leg_index;
            epoch_fuel += reindexed.fuel_kg;
            epoch_time += reindexed.time_h;
            committed_schedule.push(reindexed);
        }

        elapsed_fuel += epoch_fuel;
        elapsed_time += epoch_time;
        current_leg_idx += legs_committed;

        decision_log.push(DecisionPoint {
            nominal_hour,
            elapsed_hour: elapsed_time,
            sample_hour,
            node_index: current_leg_idx,
            legs_committed,
            elapsed_fuel_kg: elapsed_fuel,
            elapsed_time_h: elapsed_time,
            solver_status: sub_outcome.solver_status,
            planned_remaining_fuel_kg: sub_outcome.total_fuel_kg,
            planned_remaining_time_h: sub_outcome.total_time_h,
        });

        epoch += 1;
    }

    let status = if current_leg_idx >= n { SolverStatus::Optimal } else { SolverStatus::Feasible };

    info!(
        legs_committed = committed_schedule.len(),
        total = n,
        ?status,
        "rolling-horizon driver finished"
    );

    Ok(RollingHorizonOutcome {
        planned: PlannedOutcome {
            total_fuel_kg: elapsed_fuel,
            total_time_h: elapsed_time,
            schedule: committed_schedule,
            solver_status: status,
            computation_time_s: start.elapsed().as_secs_f64(),
        },
        decision_log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_store::PredictedWeatherRow;

    fn calm_grid_at(sample_hour: i64) -> WeatherGrid {
        WeatherGrid::build(
            &[PredictedWeatherRow {
                node_id: 0,
                forecast_hour: 0,
                sample_hour,
                wind_speed_kmh: 0.0,
                wind_direction_deg: 0.0,
                beaufort: 0,
                wave_height_m: 0.0,
                current_speed_kmh: 0.0,
                current_direction_deg: 0.0,
            }],
            None,
        )
    }

    #[test]
    fn commits_every_leg_when_each_epoch_succeeds() {
        let legs = vec![
            LegInstance { node_id: 0, heading_deg: 90.0, distance_nm: 50.0 },
            LegInstance { node_id: 1, heading_deg: 90.0, distance_nm: 50.0 },
        ];
        let mut grids = HashMap::new();
        grids.insert(0, calm_grid_at(0));
        let ship = ShipParameters { min_speed_knots: 10.0, max_speed_knots: 15.0, ..ShipParameters::reference() };

        let outcome = solve_rolling_horizon(&legs, &grids, &ship, 1.0, 20.0, 1.0, 5.0).unwrap();
        assert_eq!(outcome.planned.solver_status, SolverStatus::Optimal);
        assert_eq!(outcome.planned.schedule.len(), 2);
        assert!(!outcome.decision_log.is_empty());
    }

    #[test]
    fn empty_route_is_an_error() {
        let grids = HashMap::from([(0, calm_grid_at(0))]);
        let result = solve_rolling_horizon(&[], &grids, &ShipParameters::reference(), 1.0, 10.0, 1.0, 5.0);
        assert!(matches!(result, Err(OptimizeError::EmptyRoute)));
    }
}
