//! Legacy pickle importer: reads a pickled `List[Node]` dump and rewrites
//! it into a fresh weather store.
//!
//! The legacy dump carries three attributes per node: `node_index` (a
//! `(longitude, latitude)` pair), `Actual_weather_conditions` (a dict keyed
//! by sample hour), and `Predicted_weather_conditions` (a dict keyed by
//! forecast hour of a dict keyed by sample hour). It carries no waypoint
//! names or segment boundaries, so those are reconstructed here against a
//! caller-supplied list of the route's original waypoint coordinates, in
//! order, using the same "each original waypoint except the last starts a
//! new segment" rule the weather collector uses when it first lays out the
//! route.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_pickle::{DeOptions, HashableValue, Value};
use thiserror::Error;
use tracing::{info, warn};

use voyage_core::geo::haversine_distance_nm;
use voyage_store::{GlobalAttributes, NodeMetadata, PredictedWeatherRow, WeatherRow, WeatherStore};

/// Coordinates within this many degrees of an original waypoint are
/// considered a match for `is_original` purposes.
const ORIGINAL_MATCH_EPSILON_DEG: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pickle decode error: {0}")]
    Pickle(#[from] serde_pickle::Error),
    #[error("weather store error: {0}")]
    Store(#[from] voyage_store::StoreError),
    #[error("malformed pickle data: {0}")]
    Malformed(String),
}

/// Read `pickle_path`, reconstruct metadata against `original_waypoints`
/// (in route order, as `(lat, lon)` pairs), and create a brand-new weather
/// store at `store_path` populated with the converted rows.
pub fn import_pickle<P: AsRef<Path>>(
    pickle_path: P,
    store_path: P,
    route_name: &str,
    original_waypoints: &[(f64, f64)],
) -> Result<WeatherStore, ImportError> {
    let reader = BufReader::new(File::open(pickle_path)?);
    let root = serde_pickle::value_from_reader(reader, DeOptions::new().replace_unresolved_globals())?;
    let node_values = as_list(&root)?;

    let mut coordinates = Vec::with_capacity(node_values.len());
    let mut actual_rows = Vec::new();
    let mut predicted_rows = Vec::new();

    for (node_id, node_value) in node_values.iter().enumerate() {
        let node_id = node_id as u32;
        let (lon, lat) = node_index(node_value)?;
        coordinates.push((lat, lon));

        if let Some(actual) = dict_get(node_value, "Actual_weather_conditions") {
            for (key, weather_value) in dict_entries(actual)? {
                let sample_hour = hashable_to_f64(key)?.round() as i64;
                actual_rows.push(parse_weather_row(node_id, sample_hour, weather_value)?);
            }
        }

        if let Some(predicted) = dict_get(node_value, "Predicted_weather_conditions") {
            for (forecast_key, sample_dict) in dict_entries(predicted)? {
                let forecast_hour = hashable_to_f64(forecast_key)?.round() as i64;
                for (sample_key, weather_value) in dict_entries(sample_dict)? {
                    let sample_hour = hashable_to_f64(sample_key)?.round() as i64;
                    predicted_rows.push(parse_predicted_row(node_id, forecast_hour, sample_hour, weather_value)?);
                }
            }
        }
    }

    let is_original: Vec<bool> = coordinates
        .iter()
        .map(|&(lat, lon)| {
            original_waypoints
                .iter()
                .any(|&(olat, olon)| (lat - olat).abs() < ORIGINAL_MATCH_EPSILON_DEG && (lon - olon).abs() < ORIGINAL_MATCH_EPSILON_DEG)
        })
        .collect();
    let segments = assign_segments(&is_original);

    let mut cumulative_distance_nm = 0.0;
    let mut metadata = Vec::with_capacity(coordinates.len());
    for (node_id, &(lat, lon)) in coordinates.iter().enumerate() {
        if node_id > 0 {
            let (prev_lat, prev_lon) = coordinates[node_id - 1];
            cumulative_distance_nm += haversine_distance_nm(prev_lat, prev_lon, lat, lon);
        }
        metadata.push(NodeMetadata {
            node_id: node_id as u32,
            lat,
            lon,
            name: format!("node_{node_id}"),
            is_original: is_original[node_id],
            cumulative_distance_nm,
            segment: segments[node_id],
        });
    }

    let total_originals = is_original.iter().filter(|&&o| o).count();
    if total_originals != original_waypoints.len() {
        warn!(
            found = total_originals,
            expected = original_waypoints.len(),
            "pickle coordinates matched fewer original waypoints than supplied"
        );
    }

    let attrs = GlobalAttributes { route_name: route_name.to_string(), total_distance_nm: cumulative_distance_nm };
    let store = WeatherStore::create(store_path, &metadata, &attrs)?;
    store.append_actual(&actual_rows)?;
    store.append_predicted(&predicted_rows)?;

    info!(
        nodes = metadata.len(),
        actual_rows = actual_rows.len(),
        predicted_rows = predicted_rows.len(),
        "imported legacy pickle dump into weather store"
    );

    Ok(store)
}

/// Assign each node's segment index by the rule: each original waypoint
/// (save the last) opens a new segment; every node up to the next original
/// waypoint belongs to that segment; the final original waypoint reuses
/// the previous segment (it only ever terminates a leg, never starts one).
fn assign_segments(is_original: &[bool]) -> Vec<u32> {
    let original_positions: Vec<usize> = is_original.iter().enumerate().filter(|&(_, &o)| o).map(|(i, _)| i).collect();
    let mut segments = vec![0u32; is_original.len()];

    for (seq, &pos) in original_positions.iter().enumerate() {
        let segment = if seq + 1 < original_positions.len() { seq } else { seq.saturating_sub(1) };
        segments[pos] = segment as u32;
    }
    for (idx, &original) in is_original.iter().enumerate() {
        if original {
            continue;
        }
        let segment = original_positions.iter().rposition(|&p| p < idx).unwrap_or(0);
        segments[idx] = segment as u32;
    }
    segments
}

fn node_index(node_value: &Value) -> Result<(f64, f64), ImportError> {
    let raw = dict_get(node_value, "node_index")
        .ok_or_else(|| ImportError::Malformed("node missing node_index".to_string()))?;
    let items = as_list(raw)?;
    if items.len() != 2 {
        return Err(ImportError::Malformed("node_index must have exactly 2 elements".to_string()));
    }
    Ok((value_to_f64(&items[0])?, value_to_f64(&items[1])?))
}

fn parse_weather_row(node_id: u32, sample_hour: i64, weather_value: &Value) -> Result<WeatherRow, ImportError> {
    Ok(WeatherRow {
        node_id,
        sample_hour,
        wind_speed_kmh: weather_field(weather_value, "wind_speed_10m_kmh")?,
        wind_direction_deg: weather_field(weather_value, "wind_direction_10m_deg")?,
        beaufort: weather_field(weather_value, "beaufort_number")? as u8,
        wave_height_m: weather_field(weather_value, "wave_height_m")?,
        current_speed_kmh: weather_field(weather_value, "ocean_current_velocity_kmh")?,
        current_direction_deg: weather_field(weather_value, "ocean_current_direction_deg")?,
    })
}

fn parse_predicted_row(
    node_id: u32,
    forecast_hour: i64,
    sample_hour: i64,
    weather_value: &Value,
) -> Result<PredictedWeatherRow, ImportError> {
    Ok(PredictedWeatherRow {
        node_id,
        forecast_hour,
        sample_hour,
        wind_speed_kmh: weather_field(weather_value, "wind_speed_10m_kmh")?,
        wind_direction_deg: weather_field(weather_value, "wind_direction_10m_deg")?,
        beaufort: weather_field(weather_value, "beaufort_number")? as u8,
        wave_height_m: weather_field(weather_value, "wave_height_m")?,
        current_speed_kmh: weather_field(weather_value, "ocean_current_velocity_kmh")?,
        current_direction_deg: weather_field(weather_value, "ocean_current_direction_deg")?,
    })
}

fn weather_field(weather_value: &Value, field: &str) -> Result<f64, ImportError> {
    match dict_get(weather_value, field) {
        Some(value) => value_to_f64(value),
        None => Ok(f64::NAN),
    }
}

fn as_list(value: &Value) -> Result<&Vec<Value>, ImportError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        _ => Err(ImportError::Malformed("expected a pickled list or tuple".to_string())),
    }
}

fn dict_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Dict(map) => map.get(&HashableValue::String(key.to_string())),
        _ => None,
    }
}

fn dict_entries(value: &Value) -> Result<Vec<(&HashableValue, &Value)>, ImportError> {
    match value {
        Value::Dict(map) => Ok(map.iter().collect()),
        _ => Err(ImportError::Malformed("expected a pickled dict".to_string())),
    }
}

fn value_to_f64(value: &Value) -> Result<f64, ImportError> {
    match value {
        Value::F64(v) => Ok(*v),
        Value::I64(v) => Ok(*v as f64),
        Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
        Value::None => Ok(f64::NAN),
        _ => Err(ImportError::Malformed(format!("expected a number, got {value:?}"))),
    }
}

fn hashable_to_f64(value: &HashableValue) -> Result<f64, ImportError> {
    match value {
        HashableValue::F64(v) => Ok((*v).into()),
        HashableValue::I64(v) => Ok(*v as f64),
        _ => Err(ImportError::Malformed(format!("expected a numeric dict key, got {value:?}"))),
    }
}
