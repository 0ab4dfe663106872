//! Product SKU derivation
//!
//! `AR-<ASIN>` or `AR-<ASIN>-<CODE>` when the condition is one of the known
//! grades. Used both by bulk import and by the single-item `sku` command.

use super::normalize::normalize_key;

pub const SKU_PREFIX: &str = "AR";

/// Recognized item conditions and their SKU suffix codes
pub const CONDITION_CODES: [(&str, &str); 5] = [
    ("Brand New", "BN"),
    ("Like New", "LN"),
    ("Used", "US"),
    ("Refurbished", "RF"),
    ("Max", "MX"),
];

/// Suffix code for a condition, matched on its normalized form
pub fn condition_code(condition: &str) -> Option<&'static str> {
    let key = normalize_key(condition);
    if key.is_empty() {
        return None;
    }
    CONDITION_CODES
        .iter()
        .find(|(label, _)| normalize_key(label) == key)
        .map(|(_, code)| *code)
}

/// Derive a SKU from ASIN and condition. An empty ASIN yields an empty SKU.
pub fn derive_sku(asin: &str, condition: &str) -> String {
    let asin = asin.trim();
    if asin.is_empty() {
        return String::new();
    }

    match condition_code(condition) {
        Some(code) => format!("{}-{}-{}", SKU_PREFIX, asin, code),
        None => format!("{}-{}", SKU_PREFIX, asin),
    }
}
