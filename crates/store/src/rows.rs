//! HDF5 compound-type mirrors of the public records, plus the conversions
//! between them. Kept private: nothing outside this crate should name an
//! `hdf5::H5Type`.

use hdf5::H5Type;
use hdf5::types::VarLenUnicode;

use crate::records::{NodeMetadata, PredictedWeatherRow, WeatherRow};

#[derive(H5Type, Clone, Debug)]
#[repr(C)]
pub struct NodeMetadataRow {
    pub node_id: u32,
    pub lat: f64,
    pub lon: f64,
    pub name: VarLenUnicode,
    pub is_original: u8,
    pub cumulative_distance_nm: f64,
    pub segment: u32,
}

impl From<&NodeMetadata> for NodeMetadataRow {
    fn from(r: &NodeMetadata) -> Self {
        NodeMetadataRow {
            node_id: r.node_id,
            lat: r.lat,
            lon: r.lon,
            name: r.name.parse().unwrap_or_default(),
            is_original: u8::from(r.is_original),
            cumulative_distance_nm: r.cumulative_distance_nm,
            segment: r.segment,
        }
    }
}

impl From<&NodeMetadataRow> for NodeMetadata {
    fn from(r: &NodeMetadataRow) -> Self {
        NodeMetadata {
            node_id: r.node_id,
            lat: r.lat,
            lon: r.lon,
            name: r.name.to_string(),
            is_original: r.is_original != 0,
            cumulative_distance_nm: r.cumulative_distance_nm,
            segment: r.segment,
        }
    }
}

#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
pub struct WeatherRowH5 {
    pub node_id: u32,
    pub sample_hour: i64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub beaufort: u8,
    pub wave_height_m: f64,
    pub current_speed_kmh: f64,
    pub current_direction_deg: f64,
}

impl From<&WeatherRow> for WeatherRowH5 {
    fn from(r: &WeatherRow) -> Self {
        WeatherRowH5 {
            node_id: r.node_id,
            sample_hour: r.sample_hour,
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}

impl From<&WeatherRowH5> for WeatherRow {
    fn from(r: &WeatherRowH5) -> Self {
        WeatherRow {
            node_id: r.node_id,
            sample_hour: r.sample_hour,
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}

#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
pub struct PredictedWeatherRowH5 {
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

impl From<&PredictedWeatherRow> for PredictedWeatherRowH5 {
    fn from(r: &PredictedWeatherRow) -> Self {
        PredictedWeatherRowH5 {
            node_id: r.node_id,
            forecast_hour: r.forecast_hour,
            sample_hour: r.sample_hour,
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}

impl From<&PredictedWeatherRowH5> for PredictedWeatherRow {
    fn from(r: &PredictedWeatherRowH5) -> Self {
        PredictedWeatherRow {
            node_id: r.node_id,
            forecast_hour: r.forecast_hour,
            sample_hour: r.sample_hour,
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            beaufort: r.beaufort,
            wave_height_m: r.wave_height_m,
            current_speed_kmh: r.current_speed_kmh,
            current_direction_deg: r.current_direction_deg,
        }
    }
}
