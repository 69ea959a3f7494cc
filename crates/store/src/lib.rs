//! HDF5-backed weather store: a fixed metadata table plus two appendable
//! weather relations (observed and forecast).
//!
//! Per the resource-ownership rule, the store never keeps a long-lived
//! `hdf5::File` handle: [`WeatherStore`] only remembers its path, and every
//! operation opens the file, does its work, and lets it close at the end of
//! the call.

mod records;
mod rows;

use std::path::{Path, PathBuf};

use hdf5::File;
use thiserror::Error;
use tracing::debug;

pub use records::{GlobalAttributes, NodeMetadata, PredictedWeatherRow, WeatherRow};
use rows::{NodeMetadataRow, PredictedWeatherRowH5, WeatherRowH5};

const CHUNK_SIZE: usize = 1024;

/// Errors raised while creating, opening, reading, or appending to a
/// weather store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
    #[error("weather store at {path:?} is missing required table '{table}'")]
    SchemaMismatch { path: PathBuf, table: String },
}

/// Handle to a weather store on disk, identified only by its path.
#[derive(Debug, Clone)]
pub struct WeatherStore {
    path: PathBuf,
}

impl WeatherStore {
    /// Create a new store with the given fixed metadata and global
    /// attributes. Fails if a file already exists at `path`.
    pub fn create<P: AsRef<Path>>(
        path: P,
        metadata: &[NodeMetadata],
        attrs: &GlobalAttributes,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        let rows: Vec<NodeMetadataRow> = metadata.iter().map(NodeMetadataRow::from).collect();
        let meta_group = file.create_group("metadata")?;
        meta_group
            .new_dataset::<NodeMetadataRow>()
            .shape(rows.len())
            .create("rows")?
            .write(&rows)?;

        file.create_group("actual_weather")?
            .new_dataset::<WeatherRowH5>()
            .shape((0..,))
            .chunk(CHUNK_SIZE)
            .create("rows")?;

        file.create_group("predicted_weather")?
            .new_dataset::<PredictedWeatherRowH5>()
            .shape((0..,))
            .chunk(CHUNK_SIZE)
            .create("rows")?;

        let route_name: hdf5::types::VarLenUnicode =
            attrs.route_name.parse().unwrap_or_default();
        file.new_attr::<hdf5::types::VarLenUnicode>()
            .create("route_name")?
            .write_scalar(&route_name)?;
        file.new_attr::<f64>()
            .create("total_distance_nm")?
            .write_scalar(&attrs.total_distance_nm)?;

        debug!(nodes = metadata.len(), path = ?path, "created weather store");
        Ok(WeatherStore { path })
    }

    /// Open an existing store, verifying the three required tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        for table in ["metadata", "actual_weather", "predicted_weather"] {
            if file.group(table).is_err() {
                return Err(StoreError::SchemaMismatch { path, table: table.to_string() });
            }
        }
        Ok(WeatherStore { path })
    }

    /// Append rows to the observed-weather table.
    pub fn append_actual(&self, rows: &[WeatherRow]) -> Result<(), StoreError> {
        let file = File::open_rw(&self.path)?;
        let h5_rows: Vec<WeatherRowH5> = rows.iter().map(WeatherRowH5::from).collect();
        append_rows(&file, "actual_weather", &h5_rows)
    }

    /// Append rows to the forecast-weather table.
    pub fn append_predicted(&self, rows: &[PredictedWeatherRow]) -> Result<(), StoreError> {
        let file = File::open_rw(&self.path)?;
        let h5_rows: Vec<PredictedWeatherRowH5> = rows.iter().map(PredictedWeatherRowH5::from).collect();
        append_rows(&file, "predicted_weather", &h5_rows)
    }

    /// Read the fixed metadata table, ordered by node id.
    pub fn read_metadata(&self) -> Result<Vec<NodeMetadata>, StoreError> {
        let file = File::open(&self.path)?;
        let dataset = file.dataset("metadata/rows")?;
        let rows: Vec<NodeMetadataRow> = dataset.read_raw()?;
        let mut records: Vec<NodeMetadata> = rows.iter().map(NodeMetadata::from).collect();
        records.sort_by_key(|r| r.node_id);
        Ok(records)
    }

    /// Read observed weather, optionally filtered by sample hour and/or
    /// node id.
    pub fn read_actual(&self, sample_hour: Option<i64>, node_id: Option<u32>) -> Result<Vec<WeatherRow>, StoreError> {
        let file = File::open(&self.path)?;
        let dataset = file.dataset("actual_weather/rows")?;
        let rows: Vec<WeatherRowH5> = dataset.read_raw()?;
        Ok(rows
            .iter()
            .map(WeatherRow::from)
            .filter(|r| sample_hour.is_none_or(|sh| r.sample_hour == sh))
            .filter(|r| node_id.is_none_or(|id| r.node_id == id))
            .collect())
    }

    /// Read forecast weather, optionally filtered by sample hour, forecast
    /// hour, and/or node id.
    pub fn read_predicted(
        &self,
        sample_hour: Option<i64>,
        forecast_hour: Option<i64>,
        node_id: Option<u32>,
    ) -> Result<Vec<PredictedWeatherRow>, StoreError> {
        let file = File::open(&self.path)?;
        let dataset = file.dataset("predicted_weather/rows")?;
        let rows: Vec<PredictedWeatherRowH5> = dataset.read_raw()?;
        Ok(rows
            .iter()
            .map(PredictedWeatherRow::from)
            .filter(|r| sample_hour.is_none_or(|sh| r.sample_hour == sh))
            .filter(|r| forecast_hour.is_none_or(|fh| r.forecast_hour == fh))
            .filter(|r| node_id.is_none_or(|id| r.node_id == id))
            .collect())
    }

    /// The global attributes written at creation time.
    pub fn read_attrs(&self) -> Result<GlobalAttributes, StoreError> {
        let file = File::open(&self.path)?;
        let route_name: hdf5::types::VarLenUnicode = file.attr("route_name")?.read_scalar()?;
        let total_distance_nm: f64 = file.attr("total_distance_nm")?.read_scalar()?;
        Ok(GlobalAttributes { route_name: route_name.to_string(), total_distance_nm })
    }

    /// Sorted, deduplicated list of sample hours with completed observed
    /// weather, used by the collector to resume after a restart.
    pub fn get_completed_sample_hours(&self) -> Result<Vec<i64>, StoreError> {
        let rows = self.read_actual(None, None)?;
        let mut hours: Vec<i64> = rows.iter().map(|r| r.sample_hour).collect();
        hours.sort_unstable();
        hours.dedup();
        Ok(hours)
    }

    /// The filesystem path backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Vec<NodeMetadata> {
        vec![
            NodeMetadata {
                node_id: 0,
                lat: 10.0,
                lon: 20.0,
                name: "origin".to_string(),
                is_original: true,
                cumulative_distance_nm: 0.0,
                segment: 0,
            },
            NodeMetadata {
                node_id: 1,
                lat: 10.5,
                lon: 20.5,
                name: "destination".to_string(),
                is_original: true,
                cumulative_distance_nm: 100.0,
                segment: 0,
            },
        ]
    }

    #[test]
    fn metadata_round_trips_through_create_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.h5");
        let attrs = GlobalAttributes { route_name: "test-route".to_string(), total_distance_nm: 100.0 };
        let store = WeatherStore::create(&path, &sample_metadata(), &attrs).unwrap();

        let read_back = store.read_metadata().unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].name, "origin");
        assert_eq!(read_back[1].cumulative_distance_nm, 100.0);

        let read_attrs = store.read_attrs().unwrap();
        assert_eq!(read_attrs.route_name, "test-route");
    }

    #[test]
    fn append_and_read_actual_weather() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.h5");
        let attrs = GlobalAttributes { route_name: "r".to_string(), total_distance_nm: 100.0 };
        let store = WeatherStore::create(&path, &sample_metadata(), &attrs).unwrap();

        let rows = vec![
            WeatherRow {
                node_id: 0,
                sample_hour: 0,
                wind_speed_kmh: 10.0,
                wind_direction_deg: 90.0,
                beaufort: 3,
                wave_height_m: 1.0,
                current_speed_kmh: 0.0,
                current_direction_deg: 0.0,
            },
            WeatherRow {
                node_id: 1,
                sample_hour: 0,
                wind_speed_kmh: 12.0,
                wind_direction_deg: 95.0,
                beaufort: 3,
                wave_height_m: 1.2,
                current_speed_kmh: 1.0,
                current_direction_deg: 45.0,
            },
        ];
        store.append_actual(&rows).unwrap();

        let all = store.read_actual(None, None).unwrap();
        assert_eq!(all.len(), 2);

        let node0_only = store.read_actual(None, Some(0)).unwrap();
        assert_eq!(node0_only.len(), 1);
        assert_eq!(node0_only[0].node_id, 0);

        let hours = store.get_completed_sample_hours().unwrap();
        assert_eq!(hours, vec![0]);
    }

    #[test]
    fn opening_a_store_missing_tables_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.h5");
        {
            let _ = File::create(&path).unwrap();
        }
        let result = WeatherStore::open(&path);
        assert!(matches!(result, Err(StoreError::SchemaMismatch { .. })));
    }
}

fn append_rows<T: hdf5::H5Type>(file: &File, group: &str, rows: &[T]) -> Result<(), StoreError> {
    let dataset = file.dataset(&format!("{group}/rows"))?;
    let old_len = dataset.shape().first().copied().unwrap_or(0);
    let new_len = old_len + rows.len();
    if rows.is_empty() {
        return Ok(());
    }
    dataset.resize((new_len,))?;
    dataset.write_slice(rows, old_len..new_len)?;
    debug!(group, old_len, new_len, "appended weather rows");
    Ok(())
}
