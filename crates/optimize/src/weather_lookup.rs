//! Weather-grid lookup with the exact -> nearest-available -> calm
//! fallback chain used by the dynamic DP and rolling-horizon tiers.

use std::collections::HashMap;

use tracing::debug;
use voyage_physics::Weather;
use voyage_store::PredictedWeatherRow;

/// How a weather lookup was satisfied, for debug-counter visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Exact,
    NearestAvailable,
    CalmFallback,
}

/// Per-node forecast series for one sample hour, indexed by forecast hour.
pub struct WeatherGrid {
    by_node: HashMap<u32, Vec<(i64, Weather)>>,
}

impl WeatherGrid {
    /// Build a grid from predicted-weather rows already filtered to one
    /// sample hour. `max_forecast_horizon`, when set, drops any row whose
    /// forecast hour exceeds it, matching `dynamic_det.max_forecast_horizon`.
    pub fn build(rows: &[PredictedWeatherRow], max_forecast_horizon: Option<i64>) -> Self {
        let mut by_node: HashMap<u32, Vec<(i64, Weather)>> = HashMap::new();
        for &row in rows {
            if max_forecast_horizon.is_some_and(|cap| row.forecast_hour > cap) {
                continue;
            }
            by_node.entry(row.node_id).or_default().push((row.forecast_hour, row.into()));
        }
        for entries in by_node.values_mut() {
            entries.sort_by_key(|(fh, _)| *fh);
        }
        WeatherGrid { by_node }
    }

    /// Look up the weather for `node_id` at `forecast_hour`, falling back to
    /// the nearest available forecast hour for that node, then to calm
    /// defaults if the node has no forecast data at all.
    pub fn lookup(&self, node_id: u32, forecast_hour: i64) -> (Weather, LookupKind) {
        let Some(entries) = self.by_node.get(&node_id) else {
            debug!(node_id, forecast_hour, "no forecast data for node, using calm defaults");
            return (Weather::calm(), LookupKind::CalmFallback);
        };

        if let Ok(idx) = entries.binary_search_by_key(&forecast_hour, |(fh, _)| *fh) {
            return (entries[idx].1, LookupKind::Exact);
        }

        match entries.iter().min_by_key(|(fh, _)| (fh - forecast_hour).abs()) {
            Some((nearest_fh, weather)) => {
                debug!(node_id, forecast_hour, nearest_fh, "forecast hour missing, using nearest available");
                (*weather, LookupKind::NearestAvailable)
            }
            None => (Weather::calm(), LookupKind::CalmFallback),
        }
    }

    /// The maximum forecast hour available for any node, used to clip DP
    /// lookups into the grid's actual coverage.
    pub fn max_forecast_hour(&self) -> Option<i64> {
        self.by_node.values().flat_map(|entries| entries.iter().map(|(fh, _)| *fh)).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(node_id: u32, forecast_hour: i64) -> PredictedWeatherRow {
        PredictedWeatherRow {
            node_id,
            forecast_hour,
            sample_hour: 0,
            wind_speed_kmh: 10.0,
            wind_direction_deg: 90.0,
            beaufort: 3,
            wave_height_m: 1.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        }
    }

    #[test]
    fn exact_match_is_preferred() {
        let grid = WeatherGrid::build(&[row(0, 0), row(0, 1), row(0, 2)], None);
        let (_, kind) = grid.lookup(0, 1);
        assert_eq!(kind, LookupKind::Exact);
    }

    #[test]
    fn missing_hour_falls_back_to_nearest() {
        let grid = WeatherGrid::build(&[row(0, 0), row(0, 5)], None);
        let (_, kind) = grid.lookup(0, 2);
        assert_eq!(kind, LookupKind::NearestAvailable);
    }

    #[test]
    fn missing_node_falls_back_to_calm() {
        let grid = WeatherGrid::build(&[row(0, 0)], None);
        let (weather, kind) = grid.lookup(99, 0);
        assert_eq!(kind, LookupKind::CalmFallback);
        assert_eq!(weather, Weather::calm());
    }
}
