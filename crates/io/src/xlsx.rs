// Excel extract loading (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use aprecon_engine::{CellValue, RawRow, ReconError};

use crate::TableData;

/// Load the first sheet of a workbook. Upstream extracts are single-sheet
/// report dumps; additional sheets are ignored with a diagnostic.
pub fn load(path: &Path) -> Result<TableData, ReconError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ReconError::Io(format!("cannot open {}: {e}", path.display())))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first().cloned() else {
        return Err(ReconError::Io(format!(
            "{} contains no sheets",
            path.display()
        )));
    };
    if sheet_names.len() > 1 {
        debug!(
            sheets = sheet_names.len(),
            using = %first,
            "workbook has multiple sheets, using the first"
        );
    }

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| ReconError::Io(format!("cannot read sheet '{first}': {e}")))?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();

    for row in range.rows() {
        if headers.is_empty() {
            // First row carrying any text is the header band; report
            // dumps often start with blank or title rows.
            let texts: Vec<String> = row.iter().map(cell_text).collect();
            if texts.iter().filter(|t| !t.trim().is_empty()).count() > 1 {
                headers = texts.into_iter().map(|t| t.trim().to_string()).collect();
            }
            continue;
        }
        rows.push(RawRow {
            cells: row.iter().map(map_cell).collect(),
        });
    }

    if headers.is_empty() {
        return Err(ReconError::Io(format!(
            "{} has no recognizable header row",
            path.display()
        )));
    }

    Ok(TableData { headers, rows })
}

fn cell_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => format!("{other}"),
    }
}

/// Map one calamine cell into the engine's raw value. Dates come out of
/// calamine as `ExcelDateTime`; the serial is resolved against the 1900
/// epoch here so the engine only ever sees real dates or plain numbers.
fn map_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match serial_to_date(serial) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => match NaiveDate::parse_from_str(&s[..s.len().min(10)], "%Y-%m-%d")
        {
            Ok(date) => CellValue::Date(date),
            Err(_) => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if serial < 1.0 || serial > 200_000.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_mapping() {
        assert_eq!(map_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            map_cell(&Data::String("FORN 4111".to_string())),
            CellValue::Text("FORN 4111".to_string())
        );
        assert_eq!(map_cell(&Data::String("  ".to_string())), CellValue::Empty);
        assert_eq!(map_cell(&Data::Float(1500.25)), CellValue::Number(1500.25));
        assert_eq!(map_cell(&Data::Int(42)), CellValue::Number(42.0));
    }

    #[test]
    fn iso_date_cells_become_dates() {
        assert_eq!(
            map_cell(&Data::DateTimeIso("2026-01-15T00:00:00".to_string())),
            CellValue::Date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
    }

    #[test]
    fn serial_conversion_window() {
        assert_eq!(
            serial_to_date(45000.0),
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
        assert_eq!(serial_to_date(0.5), None);
        assert_eq!(serial_to_date(1e9), None);
    }
}
