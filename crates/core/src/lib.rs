//! Core units, constants, and shared primitives for the voyage optimizer workspace.

/// Physical constants used throughout the physics kernel (SI unless stated).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const GRAVITY: f64 = 9.81;
    /// Density of seawater (kg/m³), used to convert displacement tonnes to volume.
    pub const WATER_DENSITY: f64 = 1025.0;
    /// Kilograms of CO₂ emitted per kilogram of bunker fuel burned.
    pub const CO2_FACTOR: f64 = 3.17;
    /// Knots to metres per second.
    pub const KNOTS_TO_MS: f64 = 0.5144;
    /// Metres per second to knots.
    pub const MS_TO_KNOTS: f64 = 1.944;
    /// Kilometres per hour to knots.
    pub const KMH_TO_KNOTS: f64 = 1.0 / 1.852;
    /// Hours in a day, used by schedule bookkeeping.
    pub const HOURS_PER_DAY: f64 = 24.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{KMH_TO_KNOTS, KNOTS_TO_MS, MS_TO_KNOTS};

    /// Convert knots to metres per second.
    #[inline]
    pub fn knots_to_ms(v: f64) -> f64 {
        v * KNOTS_TO_MS
    }

    /// Convert metres per second to knots.
    #[inline]
    pub fn ms_to_knots(v: f64) -> f64 {
        v * MS_TO_KNOTS
    }

    /// Convert kilometres per hour to knots.
    #[inline]
    pub fn kmh_to_knots(v: f64) -> f64 {
        v * KMH_TO_KNOTS
    }

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(deg: f64) -> f64 {
        deg.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(rad: f64) -> f64 {
        rad.to_degrees()
    }
}

/// Angle wrapping helpers shared by the physics kernel and the segment
/// aggregation step (circular means).
pub mod angle {
    use std::f64::consts::PI;

    /// Wrap an angle in radians into (-π, π].
    #[inline]
    pub fn wrap_pi(rad: f64) -> f64 {
        let mut wrapped = (rad + PI) % (2.0 * PI);
        if wrapped < 0.0 {
            wrapped += 2.0 * PI;
        }
        wrapped - PI
    }

    /// Wrap a bearing in degrees into [0, 360).
    #[inline]
    pub fn wrap_360(deg: f64) -> f64 {
        let wrapped = deg % 360.0;
        if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
    }

    /// Circular (NaN-ignoring) mean of a set of angles given in degrees,
    /// returned in [0, 360). Returns `None` if every entry is NaN or the
    /// slice is empty.
    pub fn circular_mean_deg(angles_deg: &[f64]) -> Option<f64> {
        let (mut sum_sin, mut sum_cos, mut count) = (0.0, 0.0, 0usize);
        for &deg in angles_deg {
            if deg.is_nan() {
                continue;
            }
            let rad = deg.to_radians();
            sum_sin += rad.sin();
            sum_cos += rad.cos();
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let mean_rad = sum_sin.atan2(sum_cos);
        Some(wrap_360(mean_rad.to_degrees()))
    }
}

/// Great-circle geometry: forward azimuth and distance between waypoints.
pub mod geo {
    use super::angle::wrap_360;

    const EARTH_RADIUS_KM: f64 = 6371.0;
    const NAUTICAL_MILE_KM: f64 = 1.852;

    /// Forward bearing in degrees [0, 360) from (lat1, lon1) to (lat2, lon2),
    /// all inputs in degrees.
    pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let delta_lambda = (lon2 - lon1).to_radians();

        let y = delta_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
        wrap_360(y.atan2(x).to_degrees())
    }

    /// Great-circle (haversine) distance in nautical miles between two
    /// waypoints given in degrees.
    pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let delta_phi = (lat2 - lat1).to_radians();
        let delta_lambda = (lon2 - lon1).to_radians();

        let a = (delta_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        (EARTH_RADIUS_KM * c) / NAUTICAL_MILE_KM
    }
}

/// NaN-tolerant scalar helpers used when aggregating weather readings.
pub mod stats {
    /// Arithmetic mean of a slice, ignoring NaN entries. Returns `None` if
    /// every entry is NaN or the slice is empty.
    pub fn nanmean(values: &[f64]) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in values {
            if !v.is_nan() {
                sum += v;
                count += 1;
            }
        }
        if count == 0 { None } else { Some(sum / count as f64) }
    }

    /// Replace NaN with a default value.
    #[inline]
    pub fn nan_or(value: f64, default: f64) -> f64 {
        if value.is_nan() { default } else { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_360_handles_negative_and_overflow() {
        assert!((angle::wrap_360(-10.0) - 350.0).abs() < 1e-9);
        assert!((angle::wrap_360(370.0) - 10.0).abs() < 1e-9);
        assert!((angle::wrap_360(0.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn circular_mean_crosses_zero_cleanly() {
        let mean = angle::circular_mean_deg(&[350.0, 10.0]).unwrap();
        assert!((mean - 0.0).abs() < 1e-6 || (mean - 360.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_due_east_on_equator() {
        let bearing = geo::bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((bearing - 90.0).abs() < 1e-6);
    }

    #[test]
    fn haversine_distance_same_point_is_zero() {
        assert!(geo::haversine_distance_nm(10.0, 20.0, 10.0, 20.0).abs() < 1e-9);
    }

    #[test]
    fn haversine_distance_one_degree_longitude_on_equator_is_about_60nm() {
        let nm = geo::haversine_distance_nm(0.0, 0.0, 0.0, 1.0);
        assert!((nm - 60.0).abs() < 1.0, "got {nm}");
    }

    #[test]
    fn nanmean_ignores_nan_entries() {
        let mean = stats::nanmean(&[1.0, f64::NAN, 3.0]).unwrap();
        assert!((mean - 2.0).abs() < 1e-9);
    }
}
