// CSV/TSV extract loading

use std::io::Read;
use std::path::Path;

use aprecon_engine::{CellValue, RawRow, ReconError};

use crate::TableData;

pub fn load(path: &Path) -> Result<TableData, ReconError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    load_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines: for each candidate, the delimiter producing the
/// most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // More columns and more lines agreeing with line 1 both raise
        // the score.
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed. Excel-exported CSVs are
/// commonly Windows-1252, which also covers Latin-1.
fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn load_from_string(content: &str, delimiter: u8) -> Result<TableData, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| ReconError::Io(e.to_string()))?;
        if headers.is_empty() {
            // First non-blank record is the header band.
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            headers = record.iter().map(|f| f.trim().to_string()).collect();
            continue;
        }
        let cells = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        rows.push(RawRow { cells });
    }

    if headers.is_empty() {
        return Err(ReconError::Io("extract contains no header row".to_string()));
    }

    Ok(TableData { headers, rows })
}
