//! Rendering schedules for display and export
//!
//! Every renderer writes to any `io::Write`, so the CLI can print to stdout
//! and the same code can write files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::schedule::{DerivedResult, ScheduleResult};

pub mod csv;
pub mod json;
pub mod table;
pub mod text;

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Terminal tables
    #[default]
    Table,
    Json,
    Text,
    Csv,
}

impl ExportFormat {
    /// Guess a format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "txt" | "text" => Some(ExportFormat::Text),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ExportFormat::Table),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Table => write!(f, "table"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
}

/// Render a full schedule in the requested format
pub fn export_schedule<W: Write>(
    result: &ScheduleResult,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Table => table::write_schedule(result, writer),
        ExportFormat::Json => json::write_json(result, writer),
        ExportFormat::Text => text::write_schedule(result, writer),
        ExportFormat::Csv => csv::write_candidates(result, writer),
    }
}

/// Render the landmarks re-derived for a selected candidate
pub fn export_selection<W: Write>(
    derived: &DerivedResult,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Table => table::write_selection(derived, writer),
        ExportFormat::Json => json::write_json(derived, writer),
        ExportFormat::Text => text::write_selection(derived, writer),
        ExportFormat::Csv => Err(ExportError::UnsupportedFormat(
            "csv export of a selection; use json or text".to_string(),
        )),
    }
}

/// Write a schedule to a file
pub fn export_schedule_to_file<P: AsRef<Path>>(
    result: &ScheduleResult,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    export_schedule(result, format, std::io::BufWriter::new(file))
}
