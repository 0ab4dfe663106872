//! stockroom - inventory admin CLI
//!
//! # Usage
//!
//! ```bash
//! # Write an import template, fill it in, then import it
//! stockroom template product -o products.xlsx
//! stockroom import product products.xlsx --report report.xlsx
//!
//! # Fix a cell without editing the file
//! stockroom import vendor vendors.csv --set 4:Name="Globex Ltd" --yes
//!
//! # Browse a collection
//! stockroom list products --search lamp --sort price --desc --page 2
//! ```

mod api;
mod cli;
mod config;
mod import;
mod services;

use anyhow::Result;
use clap::Parser;
use colored::*;

use cli::commands::{config as config_cmd, import as import_cmd, list, sku, template};
use cli::{AppContext, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Before the logger so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Failed to load .env: {}", e),
    }

    if let Err(e) = run(cli).await {
        log::debug!("Command failed: {:?}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    let overrides = cli.overrides();

    match cli.command {
        Commands::Sku { asin, condition } => sku::handle_sku_command(&asin, &condition),
        Commands::Template { entity, output } => {
            template::handle_template_command(entity, output.as_deref())
        }
        Commands::Config { action } => {
            config_cmd::handle_config_command(action, &config_path, &overrides)
        }
        Commands::List(args) => {
            let ctx = AppContext::load(config_path, &overrides)?;
            list::handle_list_command(&ctx, args).await
        }
        Commands::Import(args) => {
            let ctx = AppContext::load(config_path, &overrides)?;
            import_cmd::handle_import_command(&ctx, args).await
        }
    }
}
