//! Shared schedule, solver-status, and result record types.
//!
//! These types are intentionally plain data with no behavior beyond small
//! accessors: the optimizer tiers produce them, the simulator consumes and
//! extends them, and the export crate serializes them. Keeping them in one
//! crate avoids a dependency cycle between `voyage_optimize` and
//! `voyage_simulate`.

use serde::{Deserialize, Serialize};

/// Outcome of a solver invocation (LP backend or DP/RH search).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    Error,
}

/// One entry in a speed schedule.
///
/// LP schedules key entries by `segment`; DP and rolling-horizon schedules
/// key entries by `node_id` (the leg's source node). Exactly one of the two
/// is populated for any given schedule; [`ScheduleEntry::key`] autodetects
/// which, so the simulator does not need a separate code path per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub leg_index: usize,
    pub node_id: Option<u32>,
    pub segment: Option<u32>,
    pub target_sog_knots: f64,
    pub reference_sws_knots: f64,
    pub distance_nm: f64,
    pub time_h: f64,
    pub fuel_kg: f64,
}

/// The key a schedule entry is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKey {
    Node(u32),
    Segment(u32),
}

impl ScheduleEntry {
    /// The key this entry should be looked up by: per-leg node id if
    /// present, else the per-segment index.
    pub fn key(&self) -> ScheduleKey {
        match self.node_id {
            Some(node_id) => ScheduleKey::Node(node_id),
            None => ScheduleKey::Segment(self.segment.unwrap_or(self.leg_index as u32)),
        }
    }
}

/// Planner output: a full schedule plus solver metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedOutcome {
    #[serde(rename = "total_fuel_kg")]
    pub total_fuel_kg: f64,
    #[serde(rename = "voyage_time_h")]
    pub total_time_h: f64,
    #[serde(rename = "speed_schedule")]
    pub schedule: Vec<ScheduleEntry>,
    pub solver_status: SolverStatus,
    pub computation_time_s: f64,
}

/// One row of the simulator's detached time-series output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub node_id: u32,
    pub segment: u32,
    pub lat: f64,
    pub lon: f64,
    pub planned_sog_knots: f64,
    pub actual_sog_knots: f64,
    pub planned_sws_knots: f64,
    pub actual_sws_knots: f64,
    pub distance_nm: f64,
    pub time_h: f64,
    pub fuel_kg: f64,
    pub cum_distance_nm: f64,
    pub cum_time_h: f64,
    pub cum_fuel_kg: f64,
    pub beaufort: u8,
    pub wave_height_m: f64,
    pub current_knots: f64,
    pub heading_deg: f64,
}

/// Simulator output: actualized totals plus the full time-series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedOutcome {
    pub total_fuel_kg: f64,
    pub total_time_h: f64,
    pub arrival_deviation_h: f64,
    pub speed_changes: u32,
    pub co2_emissions_kg: f64,
    pub sws_violations: u32,
    #[serde(skip)]
    pub time_series: Vec<TimeSeriesRow>,
}

/// Gap, efficiency, and achieved-speed metrics comparing plan to simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoyageMetrics {
    pub fuel_gap_pct: f64,
    pub fuel_per_nm: f64,
    pub avg_sog_knots: f64,
}

impl VoyageMetrics {
    /// Compute metrics from planned/simulated totals and the route's total
    /// distance, rounding per the result-record contract (4 and 6 decimals).
    pub fn compute(planned_fuel_kg: f64, simulated_fuel_kg: f64, simulated_time_h: f64, total_distance_nm: f64) -> Self {
        let fuel_gap_pct = if planned_fuel_kg > 0.0 {
            round_to(4, (simulated_fuel_kg - planned_fuel_kg) / planned_fuel_kg * 100.0)
        } else {
            0.0
        };
        let fuel_per_nm = if total_distance_nm > 0.0 {
            round_to(6, simulated_fuel_kg / total_distance_nm)
        } else {
            0.0
        };
        let avg_sog_knots = if simulated_time_h > 0.0 {
            round_to(4, total_distance_nm / simulated_time_h)
        } else {
            0.0
        };
        VoyageMetrics { fuel_gap_pct, fuel_per_nm, avg_sog_knots }
    }
}

/// Round a float to `digits` decimal places.
pub fn round_to(digits: i32, value: f64) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// One re-planning epoch's telemetry in the rolling-horizon driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub nominal_hour: f64,
    pub elapsed_hour: f64,
    pub sample_hour: i64,
    pub node_index: usize,
    pub legs_committed: usize,
    pub elapsed_fuel_kg: f64,
    pub elapsed_time_h: f64,
    pub solver_status: SolverStatus,
    pub planned_remaining_fuel_kg: f64,
    pub planned_remaining_time_h: f64,
}

/// The full per-tier result record, ready for JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyageResult {
    pub approach: String,
    pub created_at: String,
    pub config_snapshot: serde_json::Value,
    pub planned: PlannedOutcome,
    pub simulated: SimulatedOutcome,
    pub metrics: VoyageMetrics,
    pub time_series_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_keyed_entry_prefers_node_over_segment() {
        let entry = ScheduleEntry {
            leg_index: 3,
            node_id: Some(7),
            segment: Some(1),
            target_sog_knots: 10.0,
            reference_sws_knots: 10.0,
            distance_nm: 20.0,
            time_h: 2.0,
            fuel_kg: 1.4,
        };
        assert_eq!(entry.key(), ScheduleKey::Node(7));
    }

    #[test]
    fn segment_keyed_entry_used_when_node_absent() {
        let entry = ScheduleEntry {
            leg_index: 0,
            node_id: None,
            segment: Some(2),
            target_sog_knots: 10.0,
            reference_sws_knots: 10.0,
            distance_nm: 20.0,
            time_h: 2.0,
            fuel_kg: 1.4,
        };
        assert_eq!(entry.key(), ScheduleKey::Segment(2));
    }

    #[test]
    fn metrics_zero_planned_fuel_avoids_division() {
        let metrics = VoyageMetrics::compute(0.0, 10.0, 5.0, 100.0);
        assert_eq!(metrics.fuel_gap_pct, 0.0);
        assert!((metrics.avg_sog_knots - 20.0).abs() < 1e-9);
    }
}
