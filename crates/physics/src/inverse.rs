//! Inverse problem: given a target speed-over-ground, find the still-water
//! speed that achieves it, by bracketed binary search on the forward model.

use crate::kernel::speed_over_ground;
use crate::ship::ShipParameters;
use crate::weather::Weather;

const TOLERANCE_KNOTS: f64 = 0.001;
const MIN_BRACKET_WIDTH: f64 = 1e-4;
const MAX_ITERATIONS: u32 = 50;
const ACCEPTABLE_RESIDUAL: f64 = 0.1;

/// Find the still-water speed (knots) that produces `target_sog_knots` under
/// `weather` and `heading_deg`, via bracketed binary search.
///
/// The initial bracket is [5, 20] knots; if the target lies outside the SOG
/// range the bracket produces, it widens once to [1, 30]. If the search
/// still cannot converge within tolerance, the best candidate seen is
/// returned when its residual is acceptable; otherwise the target SOG
/// itself is returned as a degraded fallback, signalling to the caller
/// that a downstream clamp is likely to report a violation.
pub fn inverse_sws_from_sog(
    target_sog_knots: f64,
    weather: &Weather,
    heading_deg: f64,
    ship: &ShipParameters,
) -> f64 {
    let sog_at = |sws: f64| speed_over_ground(sws, weather, heading_deg, ship);

    let mut min_sws = 5.0_f64;
    let mut max_sws = 20.0_f64;

    if target_sog_knots < sog_at(min_sws) {
        min_sws = 1.0;
        max_sws = 5.0;
    } else if target_sog_knots > sog_at(max_sws) {
        min_sws = 20.0;
        max_sws = 30.0;
    }

    let mut best_sws = min_sws;
    let mut best_error = (sog_at(min_sws) - target_sog_knots).abs();

    for _ in 0..MAX_ITERATIONS {
        let mid = (min_sws + max_sws) / 2.0;
        let calculated_sog = sog_at(mid);
        let error = (calculated_sog - target_sog_knots).abs();

        if error < best_error {
            best_error = error;
            best_sws = mid;
        }

        if error < TOLERANCE_KNOTS || (max_sws - min_sws) < MIN_BRACKET_WIDTH {
            break;
        }

        if calculated_sog < target_sog_knots {
            min_sws = mid;
        } else {
            max_sws = mid;
        }
    }

    if best_error < ACCEPTABLE_RESIDUAL {
        best_sws
    } else {
        target_sog_knots
    }
}
