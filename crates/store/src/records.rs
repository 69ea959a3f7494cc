//! Plain-data records exposed by [`crate::WeatherStore`]. These carry no
//! HDF5 types so downstream crates do not need to depend on `hdf5`.

/// One waypoint's fixed metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetadata {
    pub node_id: u32,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub is_original: bool,
    pub cumulative_distance_nm: f64,
    pub segment: u32,
}

/// One observed-weather reading, keyed by (node_id, sample_hour).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRow {
    pub node_id: u32,
    pub sample_hour: i64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub beaufort: u8,
    pub wave_height_m: f64,
    pub current_speed_kmh: f64,
    pub current_direction_deg: f64,
}

/// One forecast-weather reading, keyed by (node_id, forecast_hour,
/// sample_hour).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedWeatherRow {
    pub node_id: u32,
    pub forecast_hour: i64,
    pub sample_hour: i64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub beaufort: u8,
    pub wave_height_m: f64,
    pub current_speed_kmh: f64,
    pub current_direction_deg: f64,
}

/// Store-wide attributes recorded at creation time.
#[derive(Debug, Clone)]
pub struct GlobalAttributes {
    pub route_name: String,
    pub total_distance_nm: f64,
}

impl From<WeatherRow> for voyage_physics::Weather {
    fn from(r: WeatherRow) -> Self {
        voyage_physics::Weather {
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}

impl From<PredictedWeatherRow> for voyage_physics::Weather {
    fn from(r: PredictedWeatherRow) -> Self {
        voyage_physics::Weather {
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}
