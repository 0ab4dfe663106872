//! Column header normalization
//!
//! Uploaded sheets spell headers however they like ("Sale Price", "sale_price",
//! "SALE-PRICE"). Everything is reduced to lower-case alphanumerics before
//! being compared against a schema's canonical keys.

use super::types::{FieldSpec, ImportRow};

/// Canonical form of a header: trimmed, lower-cased, non-alphanumerics dropped
pub fn normalize_key(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raw value of the first column (left to right) whose header normalizes to one
/// of the field's keys. Missing columns read as empty.
pub fn find_value<'a>(row: &'a ImportRow, spec: &FieldSpec) -> &'a str {
    row.cells
        .iter()
        .find(|(header, _)| {
            let key = normalize_key(header);
            spec.keys.contains(&key.as_str())
        })
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

/// Index of the first header matching the field, if any
pub fn find_column(headers: &[String], spec: &FieldSpec) -> Option<usize> {
    headers
        .iter()
        .position(|h| spec.keys.contains(&normalize_key(h).as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::{EntityKind, FieldId};

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Sale Price"), "saleprice");
        assert_eq!(normalize_key("  sale_price "), "saleprice");
        assert_eq!(normalize_key("SALE-PRICE"), "saleprice");
        assert_eq!(normalize_key("Contact Person (primary)"), "contactpersonprimary");
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("#!?"), "");
    }

    #[test]
    fn test_find_value_first_match_wins() {
        let schema = EntityKind::Product.schema();
        let price = schema.field(FieldId::Price).unwrap();
        let row = ImportRow::new(
            1,
            vec![
                ("Sale Price".to_string(), "12.5".to_string()),
                ("price".to_string(), "99".to_string()),
            ],
        );

        assert_eq!(find_value(&row, price), "12.5");
    }

    #[test]
    fn test_find_value_missing_column_is_empty() {
        let schema = EntityKind::Vendor.schema();
        let email = schema.field(FieldId::Email).unwrap();
        let row = ImportRow::new(1, vec![("Name".to_string(), "Globex".to_string())]);

        assert_eq!(find_value(&row, email), "");
    }

    #[test]
    fn test_find_column() {
        let schema = EntityKind::Employee.schema();
        let phone = schema.field(FieldId::Phone).unwrap();
        let headers = vec!["Full Name".to_string(), "Mobile".to_string()];

        assert_eq!(find_column(&headers, phone), Some(1));
    }
}
