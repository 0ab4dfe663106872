//! Read uploaded spreadsheets into import rows
//!
//! CSV files go through the `csv` crate; XLSX/XLSM/XLS/XLSB/ODS through
//! calamine's format auto-detection. Only the first sheet is read, and its
//! first row is the header row.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveTime};

use crate::import::types::ImportRow;

/// Failure to turn a file into rows. Aborts the import session.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Extension not recognized as CSV or a spreadsheet format
    UnsupportedFormat { path: PathBuf },
    /// File could not be opened or decoded
    Unreadable { path: PathBuf, message: String },
    /// Header row only, or nothing at all
    Empty { path: PathBuf },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnsupportedFormat { path } => write!(
                f,
                "Unsupported file format: {} (expected .csv, .xlsx, .xlsm, .xls, .xlsb or .ods)",
                path.display()
            ),
            ParseError::Unreadable { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
            ParseError::Empty { path } => write!(f, "File is empty: {}", path.display()),
        }
    }
}

impl std::error::Error for ParseError {}

/// Header row plus data rows of the first sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Csv,
    Workbook,
}

fn detect_format(path: &Path) -> Option<SheetFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "csv" => Some(SheetFormat::Csv),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SheetFormat::Workbook),
        _ => None,
    }
}

/// Parse a spreadsheet file into rows keyed by the original headers.
///
/// Columns with a blank header are dropped, fully blank rows are skipped, and
/// missing or empty cells become empty strings.
pub fn read_import_file<P: AsRef<Path>>(path: P) -> Result<ParsedSheet, ParseError> {
    let path = path.as_ref();
    let format = detect_format(path).ok_or_else(|| ParseError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let grid = match format {
        SheetFormat::Csv => read_csv_grid(path)?,
        SheetFormat::Workbook => read_workbook_grid(path)?,
    };

    let sheet = grid_to_sheet(grid);
    if sheet.rows.is_empty() {
        return Err(ParseError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::info!(
        "Parsed {} rows ({} columns) from {}",
        sheet.rows.len(),
        sheet.headers.len(),
        path.display()
    );
    Ok(sheet)
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> ParseError {
    ParseError::Unreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<String>>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    let mut grid: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(path, e))?;
        grid.push(record.iter().map(str::to_string).collect());
    }

    // Spreadsheet exports often start with a UTF-8 byte order mark
    if let Some(first) = grid.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    Ok(grid)
}

fn read_workbook_grid(path: &Path) -> Result<Vec<Vec<String>>, ParseError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;

    let sheet_name = match workbook.sheet_names().first() {
        Some(name) => name.clone(),
        None => {
            return Err(ParseError::Empty {
                path: path.to_path_buf(),
            });
        }
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| unreadable(path, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// Render a cell the way a user would type it back in
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) if dt.is_duration() => dt.as_f64().to_string(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Excel date serial (days since 1899-12-30) as `YYYY-MM-DD`, with the time
/// appended when it is not midnight
fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;

    match epoch.checked_add_signed(chrono::Duration::milliseconds(millis)) {
        Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

fn grid_to_sheet(grid: Vec<Vec<String>>) -> ParsedSheet {
    let mut lines = grid.into_iter();
    let header_row = lines.next().unwrap_or_default();

    // Keep (column index, header) for columns that have a header
    let columns: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty())
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        let cells: Vec<(String, String)> = columns
            .iter()
            .map(|(col, header)| (header.clone(), line.get(*col).cloned().unwrap_or_default()))
            .collect();

        let row = ImportRow::new(rows.len() + 1, cells);
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    ParsedSheet {
        headers: columns.into_iter().map(|(_, h)| h).collect(),
        rows,
    }
}
