//! Weather reading consumed by a single SOG evaluation.

use voyage_core::stats::nan_or;

/// A single-node, single-hour weather reading. NaN fields are sanitized at
/// construction time via [`Weather::sanitized`]; downstream code may assume
/// every field is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub beaufort: u8,
    pub wave_height_m: f64,
    pub current_speed_kmh: f64,
    pub current_direction_deg: f64,
}

impl Weather {
    /// Flat calm: no wind, no current, no waves.
    pub const fn calm() -> Self {
        Weather {
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        }
    }

    /// Replace NaN scalar/direction fields with calm defaults. Beaufort is an
    /// integer and cannot carry NaN.
    pub fn sanitized(self) -> Self {
        Weather {
            wind_speed_kmh: nan_or(self.wind_speed_kmh, 0.0),
            wind_direction_deg: nan_or(self.wind_direction_deg, 0.0),
            beaufort: self.beaufort,
            wave_height_m: nan_or(self.wave_height_m, 0.0),
            current_speed_kmh: nan_or(self.current_speed_kmh, 0.0),
            current_direction_deg: nan_or(self.current_direction_deg, 0.0),
        }
    }

    /// Current speed converted to knots.
    pub fn current_speed_knots(&self) -> f64 {
        self.current_speed_kmh * voyage_core::constants::KMH_TO_KNOTS
    }
}

impl Default for Weather {
    fn default() -> Self {
        Weather::calm()
    }
}
