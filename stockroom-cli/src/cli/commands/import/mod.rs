//! `import` command: parse, validate, preview and submit a spreadsheet

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::import::EntityKind;

pub use handler::handle_import_command;

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// Entity the rows describe
    #[arg(value_enum)]
    pub entity: EntityKind,

    /// Spreadsheet to import (.csv, .xlsx, .xlsm, .xls, .xlsb, .ods)
    pub file: PathBuf,

    /// Edit a cell before submitting: ROW:COLUMN=VALUE (1-based data row,
    /// column header as in the file). Repeatable.
    #[arg(long, value_name = "ROW:COLUMN=VALUE")]
    pub set: Vec<String>,

    /// Write the annotated rows to an XLSX report
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Validate and preview only; send nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Skip fetching existing records; duplicates are only checked within the file
    #[arg(long)]
    pub offline: bool,

    /// Fail when any row is invalid or rejected
    #[arg(long)]
    pub strict: bool,

    /// Show every row in the preview, not only the problem rows
    #[arg(long)]
    pub all: bool,
}
