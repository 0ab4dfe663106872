//! Parsed spreadsheet rows and their validation annotations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::{FieldError, FieldId};

/// Validity of a row after the last validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    #[default]
    Valid,
    Error,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Valid => write!(f, "valid"),
            RowStatus::Error => write!(f, "error"),
        }
    }
}

/// One spreadsheet record undergoing import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based position among the data rows (header excluded)
    pub line: usize,
    /// Raw cells in sheet column order: (original header, value)
    pub cells: Vec<(String, String)>,
    /// Name or SKU shown in previews
    pub display_key: String,
    pub status: RowStatus,
    pub errors: BTreeMap<FieldId, FieldError>,
    /// Trimmed field values resolved through the schema, including derived ones
    pub values: BTreeMap<FieldId, String>,
}

impl ImportRow {
    pub fn new(line: usize, cells: Vec<(String, String)>) -> Self {
        Self {
            line,
            cells,
            display_key: String::new(),
            status: RowStatus::Valid,
            errors: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Raw value of the first column with exactly this header
    pub fn cell(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite a cell, appending the column when the row does not have it yet.
    /// Annotations are stale afterwards until the set is validated again.
    pub fn set_cell(&mut self, header: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| h == header) {
            Some((_, v)) => *v = value,
            None => self.cells.push((header.to_string(), value)),
        }
    }

    pub fn value(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_valid(&self) -> bool {
        self.status == RowStatus::Valid
    }

    pub fn is_duplicate(&self) -> bool {
        self.errors.values().any(FieldError::is_duplicate)
    }

    /// Record an error and keep `status` in step with the error map
    pub fn push_error(&mut self, field: FieldId, error: FieldError) {
        self.errors.insert(field, error);
        self.status = RowStatus::Error;
    }

    /// Errors joined for single-cell display, e.g. "name: Required; price: Must be greater than zero"
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|(field, error)| format!("{}: {}", field, error))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}
