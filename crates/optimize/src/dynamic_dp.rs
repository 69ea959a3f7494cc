//! Dynamic deterministic Bellman DP over a (node, time-slot) lattice.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use voyage_physics::{ShipParameters, fuel_consumption_rate, speed_over_ground};
use voyage_schedule::{PlannedOutcome, ScheduleEntry, SolverStatus};
use voyage_store::NodeMetadata;

use crate::error::OptimizeError;
use crate::speed_grid::granularity_grid;
use crate::weather_lookup::WeatherGrid;

/// Tolerance (kg) within which a reconstructed schedule's total fuel must
/// match the DP's recorded cost for the result to be reported Optimal.
const FUEL_RECONCILIATION_TOLERANCE_KG: f64 = 1.0;
/// Extra slots appended past the ETA horizon so a feasible-but-late path
/// is still representable in the lattice.
const SAFETY_MARGIN_HOURS: f64 = 50.0;

/// One leg of the route: its source node, heading, and distance.
#[derive(Debug, Clone, Copy)]
pub struct LegInstance {
    pub node_id: u32,
    pub heading_deg: f64,
    pub distance_nm: f64,
}

/// Build consecutive legs from a contiguous, ascending-node-id route.
pub fn build_legs(nodes: &[NodeMetadata]) -> Vec<LegInstance> {
    nodes
        .windows(2)
        .filter_map(|w| {
            let [a, b] = w else { unreachable!() };
            let distance_nm = b.cumulative_distance_nm - a.cumulative_distance_nm;
            if distance_nm <= 0.0 {
                return None;
            }
            Some(LegInstance {
                node_id: a.node_id,
                heading_deg: voyage_core::geo::bearing_deg(a.lat, a.lon, b.lat, b.lon),
                distance_nm,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct BackPointer {
    from_slot: i64,
    speed_idx: usize,
}

/// Solve the dynamic DP for `legs`, starting at lattice slot 0 and hour
/// offset `time_offset` (non-zero when invoked as a rolling-horizon
/// sub-instance), against `weather_grid` and a speed grid stepped by
/// `speed_granularity` knots.
pub fn solve_dynamic_dp(
    legs: &[LegInstance],
    weather_grid: &WeatherGrid,
    ship: &ShipParameters,
    speed_granularity: f64,
    eta_hours: f64,
    delta_t_hours: f64,
    time_offset_hours: f64,
) -> Result<PlannedOutcome, OptimizeError> {
    if legs.is_empty() {
        return Ok(PlannedOutcome {
            total_fuel_kg: 0.0,
            total_time_h: 0.0,
            schedule: Vec::new(),
            solver_status: SolverStatus::Optimal,
            computation_time_s: 0.0,
        });
    }

    let start = Instant::now();
    let speeds = granularity_grid(ship.min_speed_knots, ship.max_speed_knots, speed_granularity);
    let k = speeds.len();
    let fcr_grid: Vec<f64> = speeds.iter().map(|&v| fuel_consumption_rate(v)).collect();

    let max_forecast_hour = weather_grid.max_forecast_hour().unwrap_or(0);
    let max_slots = (eta_hours / delta_t_hours).ceil() as i64 + (SAFETY_MARGIN_HOURS / delta_t_hours).ceil() as i64;

    let n = legs.len();
    let mut cost: Vec<HashMap<i64, f64>> = vec![HashMap::new(); n + 1];
    let mut back: Vec<HashMap<i64, BackPointer>> = vec![HashMap::new(); n + 1];
    cost[0].insert(0, 0.0);

    for i in 0..n {
        let leg = legs[i];
        let slots: Vec<i64> = cost[i].keys().copied().collect();
        for t in slots {
            let base_cost = cost[i][&t];
            let elapsed_hours = t as f64 * delta_t_hours;
            let forecast_hour = ((elapsed_hours + time_offset_hours).round() as i64).min(max_forecast_hour).max(0);
            let (weather, _kind) = weather_grid.lookup(leg.node_id, forecast_hour);

            for ki in 0..k {
                let sws = speeds[ki];
                let sog = speed_over_ground(sws, &weather, leg.heading_deg, ship).max(0.1);
                let leg_time_h = leg.distance_nm / sog;
                let arrival_hours = elapsed_hours + leg_time_h;
                let next_slot = (arrival_hours / delta_t_hours).ceil() as i64;
                if next_slot >= max_slots {
                    continue;
                }
                let edge_cost = fcr_grid[ki] * leg_time_h;
                let candidate = base_cost + edge_cost;

                let improves = match cost[i + 1].get(&next_slot) {
                    Some(&existing) => candidate < existing,
                    None => true,
                };
                if improves {
                    cost[i + 1].insert(next_slot, candidate);
                    back[i + 1].insert(next_slot, BackPointer { from_slot: t, speed_idx: ki });
                }
            }
        }
    }

    let terminal = &cost[n];
    let best_slot = terminal
        .iter()
        .filter(|&(&t, _)| t as f64 * delta_t_hours <= eta_hours)
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(&t, _)| t);

    let Some(mut slot) = best_slot else {
        info!(legs = n, "dynamic DP found no path reaching the destination within ETA");
        return Ok(PlannedOutcome {
            total_fuel_kg: 0.0,
            total_time_h: 0.0,
            schedule: Vec::new(),
            solver_status: SolverStatus::Infeasible,
            computation_time_s: start.elapsed().as_secs_f64(),
        });
    };
    let recorded_cost = cost[n][&slot];

    let mut choices = vec![0usize; n];
    let mut leg_idx = n;
    while leg_idx > 0 {
        let bp = back[leg_idx][&slot];
        choices[leg_idx - 1] = bp.speed_idx;
        slot = bp.from_slot;
        leg_idx -= 1;
    }

    let mut schedule = Vec::with_capacity(n);
    let mut total_fuel_kg = 0.0;
    let mut total_time_h = 0.0;
    let mut elapsed_hours = 0.0;

    for (i, leg) in legs.iter().enumerate() {
        let ki = choices[i];
        let sws = speeds[ki];
        let forecast_hour =
            ((elapsed_hours + time_offset_hours).round() as i64).min(max_forecast_hour).max(0);
        let (weather, _kind) = weather_grid.lookup(leg.node_id, forecast_hour);
        let sog = speed_over_ground(sws, &weather, leg.heading_deg, ship).max(0.1);
        let time_h = leg.distance_nm / sog;
        let fuel_kg = fcr_grid[ki] * time_h;

        total_fuel_kg += fuel_kg;
        total_time_h += time_h;
        elapsed_hours += time_h;

        schedule.push(ScheduleEntry {
            leg_index: i,
            node_id: Some(leg.node_id),
            segment: None,
            target_sog_knots: sog,
            reference_sws_knots: sws,
            distance_nm: leg.distance_nm,
            time_h,
            fuel_kg,
        });
    }

    let status = if (total_fuel_kg - recorded_cost).abs() <= FUEL_RECONCILIATION_TOLERANCE_KG {
        SolverStatus::Optimal
    } else {
        SolverStatus::Feasible
    };

    info!(total_fuel_kg, total_time_h, ?status, "dynamic DP reconstructed schedule");

    Ok(PlannedOutcome { total_fuel_kg, total_time_h, schedule, solver_status: status, computation_time_s: start.elapsed().as_secs_f64() })
}
