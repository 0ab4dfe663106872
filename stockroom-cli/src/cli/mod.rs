//! Command-line interface

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::{self, Config, Overrides};
use crate::import::EntityKind;
use commands::config::ConfigCommands;
use commands::import::ImportCommands;
use commands::list::ListCommands;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(author, version, about = "Inventory admin tools: list records and bulk-import spreadsheets")]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: <config dir>/stockroom/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API root URL, overriding config and environment
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token, overriding config and environment
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List, search, sort and export a collection
    List(ListCommands),
    /// Validate a spreadsheet and create its valid rows
    Import(ImportCommands),
    /// Write an empty import template for an entity
    Template {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Output file (.xlsx or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the SKU derived from an ASIN and condition
    Sku {
        asin: String,

        #[arg(short, long, default_value = "")]
        condition: String,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

impl Cli {
    /// Default log filter for the verbosity flag
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_path)
    }
}

/// Resolved settings handed to every command
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    pub fn load(config_path: PathBuf, overrides: &Overrides) -> Result<Self> {
        let config = Config::load(Some(&config_path), overrides)?;
        Ok(Self { config })
    }

    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(self.config.to_client_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_flags() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "-vv",
            "import",
            "product",
            "items.xlsx",
            "--set",
            "2:Price=10",
            "--set",
            "3:Title=Lamp",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.log_filter(), "debug");
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.entity, EntityKind::Product);
                assert_eq!(args.set, ["2:Price=10", "3:Title=Lamp"]);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "list",
            "purchase-orders",
            "--sort",
            "total",
            "--desc",
            "--page",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.log_filter(), "warn");
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.resource.collection(), "purchase-orders");
                assert!(args.desc);
                assert_eq!(args.page, 2);
                assert_eq!(args.page_size, 20);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "sku",
            "B001",
            "--api-url",
            "http://x/api",
        ])
        .unwrap();

        assert_eq!(cli.overrides().api_url.as_deref(), Some("http://x/api"));
        assert!(cli.overrides().token.is_none());
    }
}
