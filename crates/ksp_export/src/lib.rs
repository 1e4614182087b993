//! Export helpers for CSV and JSON transfer window artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

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

pub mod report {
    use std::io::Write;
    use std::path::Path;

    use serde::Serialize;

    use super::{ExportError, writer_for_path};

    /// One departure window, flattened for CSV rows and JSON arrays alike.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct WindowRecord {
        pub index: usize,
        pub departure_s: f64,
        pub departure_kerbin: String,
        pub wait_s: f64,
        pub circular_estimate_s: f64,
        pub converged: bool,
        pub iterations: u32,
        pub final_error_deg: f64,
    }

    /// Full transfer summary between two bodies.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct ReportRecord {
        pub origin: String,
        pub destination: String,
        pub reference_time_s: f64,
        pub reference_kerbin: String,
        pub synodic_period_s: f64,
        pub current_phase_deg: f64,
        pub desired_phase_deg: f64,
        pub transfer_time_s: f64,
        pub hohmann_dv1_km_s: f64,
        pub hohmann_dv2_km_s: f64,
        pub hohmann_dv_total_km_s: f64,
        pub windows: Vec<WindowRecord>,
    }

    /// Serialize a report as pretty JSON.
    pub fn to_json_string(report: &ReportRecord) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Write a report as pretty JSON to `path` (or stdout for `-`).
    pub fn write_json(path: &Path, report: &ReportRecord) -> Result<(), ExportError> {
        let mut writer = writer_for_path(path)?;
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write window rows as CSV with a header row.
    pub fn write_windows_csv<W: Write>(writer: W, windows: &[WindowRecord]) -> Result<(), ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for window in windows {
            csv_writer.serialize(window)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write window rows as CSV to `path` (or stdout for `-`).
    pub fn write_windows_csv_to(path: &Path, windows: &[WindowRecord]) -> Result<(), ExportError> {
        let writer = writer_for_path(path)?;
        write_windows_csv(writer, windows)
    }

}
