//! Spreadsheet input and output for imports
//!
//! Reading accepts the first sheet of CSV/XLSX/XLSM/XLS/XLSB/ODS files with a
//! header row. Writing produces annotated import reports, blank templates and
//! record exports.

mod reader;
mod writer;

pub use reader::{ParseError, read_import_file};
pub use writer::{json_cell, record_columns, write_records, write_report_excel, write_template};
