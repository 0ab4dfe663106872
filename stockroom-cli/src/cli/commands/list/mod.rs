//! `list` command: fetch a collection, then search, sort and page it locally

pub mod handler;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::services::Resource;
use crate::services::listing::DEFAULT_PAGE_SIZE;

pub use handler::handle_list_command;

#[derive(Args, Debug)]
pub struct ListCommands {
    #[arg(value_enum)]
    pub resource: Resource,

    /// Case-insensitive text to look for in any field
    #[arg(short, long)]
    pub search: Option<String>,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: u64,

    /// Export every matching record to a file instead (.csv, .json or .xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Fields to show, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    Table,
    /// Pretty-printed JSON of the page
    Json,
    /// CSV with a header row
    Csv,
}
