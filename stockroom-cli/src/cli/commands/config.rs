//! `config` command

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::{self, Config, Overrides};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration (token masked)
    Show,
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

/// Only `show` reads the file, so `init --force` can replace a broken one
pub fn handle_config_command(
    action: ConfigCommands,
    config_path: &Path,
    overrides: &Overrides,
) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = Config::load(Some(config_path), overrides)?;
            println!("{}", format!("# {}", config_path.display()).dimmed());
            print!("{}", config.to_display_toml()?);
        }
        ConfigCommands::Init { force } => {
            config::init(config_path, force)?;
            println!(
                "{} Config written to {}",
                "✓".bright_green(),
                config_path.display().to_string().bright_green()
            );
        }
        ConfigCommands::Path => {
            let marker = if config_path.exists() {
                String::new()
            } else {
                " (not created yet)".dimmed().to_string()
            };
            println!("{}{}", config_path.display(), marker);
        }
    }
    Ok(())
}
