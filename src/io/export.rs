//! Export the collected dataset to JSON or CSV.
//!
//! Both exports carry the same data; JSON keeps the run metadata, CSV is long format
//! for spreadsheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Dataset;
use crate::error::{AppError, EXIT_OUTPUT};
use crate::report::ReportContext;

/// JSON export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub tool: String,
    pub generated_at: String,
    pub window_size: usize,
    pub series: Vec<SeriesRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub code: String,
    pub name: String,
    pub points: Vec<PointRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub date: NaiveDate,
    /// Shares in units of 10,000.
    pub shares_wan: f64,
}

impl DatasetFile {
    pub fn from_dataset(dataset: &Dataset, ctx: ReportContext) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            generated_at: ctx.generated_at.to_rfc3339(),
            window_size: ctx.window_size,
            series: dataset
                .iter()
                .map(|s| SeriesRecord {
                    code: s.instrument().id.clone(),
                    name: s.instrument().display_name.clone(),
                    points: s
                        .points()
                        .iter()
                        .map(|p| PointRecord {
                            date: p.date,
                            shares_wan: p.value,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Write the dataset as pretty JSON.
pub fn write_dataset_json(path: &Path, dataset: &Dataset, ctx: ReportContext) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to create JSON export '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &DatasetFile::from_dataset(dataset, ctx))
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write JSON export: {e}")))?;
    out.flush()
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write JSON export: {e}")))
}

/// Write the dataset as long-format CSV: `code,name,date,shares_wan`.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to create CSV export '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    let write_err = |e: std::io::Error| AppError::new(EXIT_OUTPUT, format!("Failed to write CSV export: {e}"));

    writeln!(out, "code,name,date,shares_wan").map_err(write_err)?;
    for series in dataset.iter() {
        let inst = series.instrument();
        for p in series.points() {
            writeln!(out, "{},{},{},{}", inst.id, csv_field(&inst.display_name), p.date, p.value).map_err(write_err)?;
        }
    }
    out.flush().map_err(write_err)
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
