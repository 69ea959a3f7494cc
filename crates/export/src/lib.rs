//! CSV time-series and JSON result export.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use voyage_schedule::{TimeSeriesRow, VoyageResult};

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Write the per-leg time-series as CSV, one row per simulated leg, with
/// the exact column set the legacy result contract specifies.
pub fn write_time_series_csv(path: &Path, rows: &[TimeSeriesRow]) -> csv::Result<()> {
    let writer = writer_for_path(path)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the full per-tier result record as pretty-printed JSON.
pub fn write_result_json(path: &Path, result: &VoyageResult) -> io::Result<()> {
    let writer = writer_for_path(path)?;
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}
