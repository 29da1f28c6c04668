//! `aprecon-io` — Extract loading.
//!
//! Turns a CSV or Excel file on disk into the header list and raw rows
//! the engine consumes. No reconciliation logic lives here.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use aprecon_engine::{RawRow, ReconError};

/// One loaded extract: its header row and every data row beneath it.
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Load an extract, dispatching on file extension. CSV/TSV/TXT go
/// through the delimiter-sniffing text path; XLSX/XLS/XLSB/ODS through
/// the spreadsheet path.
pub fn load_table(path: &Path) -> Result<TableData, ReconError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => csv::load(path),
        "xlsx" | "xls" | "xlsb" | "ods" => xlsx::load(path),
        other => Err(ReconError::Io(format!(
            "unsupported extract format '{}' for {}",
            other,
            path.display()
        ))),
    }
}
