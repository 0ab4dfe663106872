//! `sku` command

use anyhow::Result;

use crate::import::sku::{CONDITION_CODES, condition_code, derive_sku};

pub fn handle_sku_command(asin: &str, condition: &str) -> Result<()> {
    let sku = derive_sku(asin, condition);
    if sku.is_empty() {
        anyhow::bail!("ASIN must not be empty");
    }

    if !condition.trim().is_empty() && condition_code(condition).is_none() {
        let known: Vec<&str> = CONDITION_CODES.iter().map(|(label, _)| *label).collect();
        log::warn!(
            "Unknown condition '{}', no suffix added (known: {})",
            condition,
            known.join(", ")
        );
    }

    println!("{}", sku);
    Ok(())
}
