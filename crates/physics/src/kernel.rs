//! Speed-over-ground and fuel-consumption model.
//!
//! Every function here is total and pure: no panics on any finite input,
//! no shared state. Angles are taken in degrees at the public boundary and
//! converted to radians internally.

use voyage_core::angle::wrap_pi;
use voyage_core::constants::{GRAVITY, KNOTS_TO_MS};

use crate::ship::{LoadingCondition, ShipParameters};
use crate::weather::Weather;

/// Angle in radians between the weather direction and the ship's heading,
/// folded into [0, π].
pub fn weather_direction_angle(weather_dir_deg: f64, heading_deg: f64) -> f64 {
    wrap_pi((weather_dir_deg - heading_deg).to_radians()).abs()
}

/// Froude number for a still-water speed (knots) and waterline length (m).
pub fn froude_number(sws_knots: f64, length_m: f64) -> f64 {
    let v_ms = sws_knots * KNOTS_TO_MS;
    v_ms / (GRAVITY * length_m).sqrt()
}

/// Directional reduction coefficient Cβ (Table 2), by relative weather
/// angle (degrees, [0, 180]) and Beaufort number.
pub fn direction_reduction_coefficient(theta_deg: f64, beaufort: u8) -> f64 {
    let bn = beaufort as f64;
    let raw = if theta_deg < 30.0 {
        2.0
    } else if theta_deg < 60.0 {
        1.7 - 0.03 * (bn - 4.0).powi(2)
    } else if theta_deg < 150.0 {
        0.9 - 0.06 * (bn - 6.0).powi(2)
    } else {
        0.4 - 0.03 * (bn - 8.0).powi(2)
    };
    raw.max(0.1)
}

/// Speed reduction coefficient CU (Table 3), reproduced verbatim from the
/// legacy tabulation, by Froude number and block coefficient.
pub fn speed_reduction_coefficient(fn_: f64, block_coefficient: f64, loading: LoadingCondition) -> f64 {
    use LoadingCondition::*;
    let cb = block_coefficient;
    let raw = if cb <= 0.55 {
        1.7 - 1.4 * fn_ - 7.4 * fn_.powi(2)
    } else if cb <= 0.60 {
        2.2 - 2.5 * fn_ - 9.7 * fn_.powi(2)
    } else if cb <= 0.65 {
        2.6 - 3.7 * fn_ - 11.6 * fn_.powi(2)
    } else if cb <= 0.70 {
        3.1 - 5.3 * fn_ - 12.4 * fn_.powi(2)
    } else if cb <= 0.75 {
        match loading {
            Normal => 2.4 - 10.6 * fn_ - 9.5 * fn_.powi(2),
            Ballast => 2.6 - 12.5 * fn_ - 13.5 * fn_.powi(2),
        }
    } else if cb <= 0.80 {
        match loading {
            Normal => 2.6 - 13.1 * fn_ - 15.1 * fn_.powi(2),
            Ballast => 3.0 - 16.3 * fn_ - 21.6 * fn_.powi(2),
        }
    } else {
        match loading {
            Normal => 3.1 - 18.7 * fn_ + 28.0 * fn_.powi(2),
            Ballast => 3.4 - 20.9 * fn_ + 31.8 * fn_.powi(2),
        }
    };
    raw.max(0.1)
}

/// Ship-form coefficient CForm (Table 4), by Beaufort number and
/// displacement volume (m³).
pub fn ship_form_coefficient(beaufort: u8, displacement_volume_m3: f64, loading: LoadingCondition) -> f64 {
    let bn = beaufort as f64;
    let nabla_23 = displacement_volume_m3.powf(2.0 / 3.0);
    match loading {
        LoadingCondition::Normal => 0.5 * bn + bn.powf(6.5) / (22.0 * nabla_23),
        LoadingCondition::Ballast => 0.7 * bn + bn.powf(6.5) / (22.0 * nabla_23),
    }
}

/// Percentage speed loss due to weather, clamped to [0, 50].
pub fn speed_loss_percentage(c_beta: f64, c_u: f64, c_form: f64) -> f64 {
    (c_beta * c_u * c_form).clamp(0.0, 50.0)
}

/// Still-water speed corrected for weather-induced loss, floored at 1 knot.
pub fn weather_corrected_speed(sws_knots: f64, loss_pct: f64) -> f64 {
    (sws_knots * (1.0 - loss_pct / 100.0)).max(1.0)
}

/// Vector synthesis of weather-corrected speed and ocean current into a
/// scalar speed-over-ground.
pub fn sog_vector_synthesis(
    weather_speed_knots: f64,
    heading_deg: f64,
    current_speed_knots: f64,
    current_direction_deg: f64,
) -> f64 {
    let heading_rad = heading_deg.to_radians();
    let current_rad = current_direction_deg.to_radians();
    let vx = weather_speed_knots * heading_rad.sin() + current_speed_knots * current_rad.sin();
    let vy = weather_speed_knots * heading_rad.cos() + current_speed_knots * current_rad.cos();
    (vx * vx + vy * vy).sqrt()
}

/// Full speed-over-ground composite: still-water speed, weather, heading,
/// and ship parameters in, achieved speed-over-ground (knots) out.
pub fn speed_over_ground(sws_knots: f64, weather: &Weather, heading_deg: f64, ship: &ShipParameters) -> f64 {
    let weather = weather.sanitized();
    let theta = weather_direction_angle(weather.wind_direction_deg, heading_deg).to_degrees();
    let fn_ = froude_number(sws_knots, ship.length_m);
    let c_beta = direction_reduction_coefficient(theta, weather.beaufort);
    let c_u = speed_reduction_coefficient(fn_, ship.block_coefficient, ship.loading);
    let c_form = ship_form_coefficient(weather.beaufort, ship.displacement_volume_m3(), ship.loading);
    let loss_pct = speed_loss_percentage(c_beta, c_u, c_form);
    let vw = weather_corrected_speed(sws_knots, loss_pct);

    let mut sog = sog_vector_synthesis(vw, heading_deg, weather.current_speed_knots(), weather.current_direction_deg);
    if weather.beaufort >= 5 {
        sog *= 0.965;
    }
    sog
}

/// Fuel consumption rate (kg/h) at a given still-water speed, floored at
/// 0.1 kg/h so a stationary ship does not report zero fuel burn.
pub fn fuel_consumption_rate(sws_knots: f64) -> f64 {
    (0.000706 * sws_knots.powi(3)).max(0.1)
}

/// Travel time (hours) for a distance (nm) at a given speed-over-ground
/// (knots). Infinite if `sog_knots` is non-positive.
pub fn travel_time_hours(distance_nm: f64, sog_knots: f64) -> f64 {
    if sog_knots <= 0.0 { f64::INFINITY } else { distance_nm / sog_knots }
}

/// CO₂ emissions (kg) for a given fuel burn (kg).
pub fn co2_emissions_kg(fuel_kg: f64) -> f64 {
    fuel_kg * voyage_core::constants::CO2_FACTOR
}
