//! Write import reports, import templates and record exports

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

use crate::import::types::{EntityKind, ImportRow};

/// Annotation columns prepended to the original headers in reports
mod special_cols {
    pub const LINE: &str = "_line";
    pub const STATUS: &str = "_status";
    pub const ERRORS: &str = "_errors";
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Write annotated rows to XLSX: `_line`, `_status`, `_errors`, then the original columns
pub fn write_report_excel(path: &Path, headers: &[String], rows: &[ImportRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Import report")?;

    let bold = Format::new().set_bold();
    let special = [special_cols::LINE, special_cols::STATUS, special_cols::ERRORS];

    for (col, name) in special.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (idx, header) in headers.iter().enumerate() {
        let col = (idx + special.len()) as u16;
        worksheet.write_string_with_format(0, col, header, &bold)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        worksheet.write_number(r, 0, row.line as f64)?;
        worksheet.write_string(r, 1, row.status.to_string())?;
        if !row.errors.is_empty() {
            worksheet.write_string(r, 2, row.error_summary())?;
        }
        // Cells line up with headers by position; names may repeat
        for idx in 0..headers.len() {
            let col = (idx + special.len()) as u16;
            if let Some((_, value)) = row.cells.get(idx) {
                if !value.is_empty() {
                    worksheet.write_string(r, col, value)?;
                }
            }
        }
    }

    worksheet.set_column_width(2, 40)?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to save report: {}", path.display()))?;
    log::info!("Import report written to: {}", path.display());
    Ok(())
}

/// Write an empty import template (header row only) as XLSX, or CSV by extension
pub fn write_template(kind: EntityKind, path: &Path) -> Result<()> {
    let labels = kind.schema().labels();

    if is_csv(path) {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        wtr.write_record(&labels)
            .context("Failed to write CSV header")?;
        wtr.flush().context("Failed to flush CSV writer")?;
    } else {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(kind.plural())?;
        let bold = Format::new().set_bold();
        for (col, label) in labels.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *label, &bold)?;
            worksheet.set_column_width(col as u16, 18)?;
        }
        workbook
            .save(path)
            .with_context(|| format!("Failed to save template: {}", path.display()))?;
    }

    log::info!("{} import template written to: {}", kind, path.display());
    Ok(())
}

/// Column order for a list of JSON records: keys of the first record, then any new keys
pub fn record_columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(obj) = record {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

/// Scalar JSON rendered as a plain cell string
pub fn json_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Export backend records to XLSX or CSV (by extension)
pub fn write_records(path: &Path, sheet_name: &str, records: &[Value]) -> Result<()> {
    let columns = record_columns(records);

    if is_csv(path) {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        wtr.write_record(&columns)
            .context("Failed to write CSV header")?;
        for record in records {
            let row: Vec<String> = columns.iter().map(|c| json_cell(record.get(c))).collect();
            wtr.write_record(&row).context("Failed to write CSV row")?;
        }
        wtr.flush().context("Failed to flush CSV writer")?;
    } else {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;
        let bold = Format::new().set_bold();

        for (col, name) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &bold)?;
        }
        for (row_idx, record) in records.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            for (col, name) in columns.iter().enumerate() {
                match record.get(name) {
                    Some(Value::Number(n)) => {
                        if let Some(f) = n.as_f64() {
                            worksheet.write_number(r, col as u16, f)?;
                        }
                    }
                    other => {
                        let text = json_cell(other);
                        if !text.is_empty() {
                            worksheet.write_string(r, col as u16, text)?;
                        }
                    }
                }
            }
        }
        workbook
            .save(path)
            .with_context(|| format!("Failed to save export: {}", path.display()))?;
    }

    log::info!("Exported {} records to: {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::excel::read_import_file;
    use crate::import::types::{FieldError, FieldId};
    use serde_json::json;
    use std::path::PathBuf;

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stockroom-test-{}.{}", uuid::Uuid::new_v4(), ext))
    }

    #[test]
    fn test_template_round_trips_through_reader_headers() {
        let path = temp_path("csv");
        write_template(EntityKind::Vendor, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(content.trim(), "Name,Phone,Email,Address,Contact Person");
    }

    #[test]
    fn test_report_has_annotation_columns() {
        let path = temp_path("xlsx");
        let headers = vec!["Name".to_string()];
        let mut bad = ImportRow::new(1, vec![("Name".to_string(), String::new())]);
        bad.push_error(FieldId::Name, FieldError::Required);
        let good = ImportRow::new(2, vec![("Name".to_string(), "Acme".to_string())]);

        write_report_excel(&path, &headers, &[bad, good]).unwrap();
        let sheet = read_import_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sheet.headers, vec!["_line", "_status", "_errors", "Name"]);
        assert_eq!(sheet.rows[0].cell("_status"), Some("error"));
        assert_eq!(sheet.rows[0].cell("_errors"), Some("name: Required"));
        assert_eq!(sheet.rows[1].cell("Name"), Some("Acme"));
    }

    #[test]
    fn test_report_keeps_repeated_headers_apart() {
        let path = temp_path("xlsx");
        let headers = vec!["Name".to_string(), "Name".to_string()];
        let row = ImportRow::new(
            1,
            vec![
                ("Name".to_string(), "Acme".to_string()),
                ("Name".to_string(), "Globex".to_string()),
            ],
        );

        write_report_excel(&path, &headers, &[row]).unwrap();
        let sheet = read_import_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let values: Vec<&str> = sheet.rows[0].cells[3..]
            .iter()
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(values, ["Acme", "Globex"]);
    }

    #[test]
    fn test_record_columns_union_in_order() {
        let records = vec![json!({"name": "A", "id": 1}), json!({"name": "B", "email": "b@x"})];
        let cols = record_columns(&records);

        assert_eq!(cols.len(), 3);
        assert!(cols.contains(&"email".to_string()));
        assert_eq!(cols.last().map(String::as_str), Some("email"));
    }

    #[test]
    fn test_write_records_csv() {
        let path = temp_path("csv");
        let records = vec![json!({"name": "Acme", "stock": 3}), json!({"name": "Globex"})];
        write_records(&path, "brands", &records).unwrap();
        let sheet = read_import_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].cell("stock"), Some(""));
    }
}
