//! Row validation
//!
//! `validate` re-derives every row's annotations from its raw cells, the
//! entity schema and the snapshot of keys that already exist on the server.
//! It clears previous annotations first, so calling it again on unchanged
//! input gives the same result. Call it after every mutation of the row set:
//! duplicate state depends on all rows, not just the edited one.

use std::collections::HashSet;

use serde_json::Value;

use super::normalize::{find_value, normalize_key};
use super::sku::derive_sku;
use super::types::{
    DuplicateSource, EntitySchema, FieldError, FieldId, FieldRule, ImportRow, RowStatus,
};

/// Normalized unique keys of records already stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingKeys {
    keys: HashSet<String>,
}

impl ExistingKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| normalize_key(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Extract the schema's unique field from backend records
    pub fn from_records(schema: &EntitySchema, records: &[Value]) -> Self {
        let key = schema.unique.payload_key();
        Self::new(records.iter().filter_map(|r| match r.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }))
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.keys.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Annotate every row with status, errors and resolved values.
///
/// Duplicate tie-break: within the batch the first occurrence of a key stays
/// clean and every later one is flagged; a key found in `existing` flags every
/// row carrying it. Empty keys never count as duplicates.
pub fn validate(schema: &EntitySchema, rows: &mut [ImportRow], existing: &ExistingKeys) {
    for row in rows.iter_mut() {
        validate_row(schema, row);
    }

    let mut seen: HashSet<String> = HashSet::new();
    for row in rows.iter_mut() {
        let key = normalize_key(row.value(schema.unique));
        if key.is_empty() {
            continue;
        }

        if existing.contains(&key) {
            row.push_error(schema.unique, FieldError::Duplicate(DuplicateSource::Existing));
        } else if !seen.insert(key) {
            row.push_error(schema.unique, FieldError::Duplicate(DuplicateSource::InBatch));
        }
    }
}

/// Per-row rules only; resets previous annotations
fn validate_row(schema: &EntitySchema, row: &mut ImportRow) {
    row.errors.clear();
    row.values.clear();
    row.status = RowStatus::Valid;

    for spec in schema.fields {
        let raw = find_value(row, spec).trim().to_string();

        let checked = match spec.rule {
            FieldRule::RequiredText => {
                if raw.is_empty() {
                    Err(FieldError::Required)
                } else {
                    Ok(raw)
                }
            }
            FieldRule::OptionalText => Ok(raw),
            FieldRule::PositiveNumber => check_number(&raw, true, true),
            FieldRule::NonNegativeNumber { required } => check_number(&raw, required, false),
            FieldRule::DerivedSku => {
                let sku = if raw.is_empty() {
                    derived_sku(schema, row)
                } else {
                    raw
                };
                if sku.is_empty() {
                    Err(FieldError::Required)
                } else {
                    Ok(sku)
                }
            }
        };

        match checked {
            Ok(value) => {
                if !value.is_empty() {
                    row.values.insert(spec.id, value);
                }
            }
            Err(error) => row.push_error(spec.id, error),
        }
    }

    row.display_key = row.value(schema.display).to_string();
}

fn derived_sku(schema: &EntitySchema, row: &ImportRow) -> String {
    let asin = schema
        .field(FieldId::Asin)
        .map(|spec| find_value(row, spec))
        .unwrap_or("");
    let condition = schema
        .field(FieldId::Condition)
        .map(|spec| find_value(row, spec))
        .unwrap_or("");
    derive_sku(asin, condition)
}

fn check_number(raw: &str, required: bool, strictly_positive: bool) -> Result<String, FieldError> {
    if raw.is_empty() {
        return if required {
            Err(FieldError::Required)
        } else {
            Ok(String::new())
        };
    }

    let number = match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return Err(FieldError::InvalidNumber(raw.to_string())),
    };

    if strictly_positive && number <= 0.0 {
        Err(FieldError::NotPositive)
    } else if number < 0.0 {
        Err(FieldError::Negative)
    } else {
        Ok(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::{EntityKind, ImportStats};

    fn rows(header: &[&str], data: &[&[&str]]) -> Vec<ImportRow> {
        data.iter()
            .enumerate()
            .map(|(i, cells)| {
                ImportRow::new(
                    i + 1,
                    header
                        .iter()
                        .zip(cells.iter())
                        .map(|(h, v)| (h.to_string(), v.to_string()))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_category_example() {
        let schema = EntityKind::Category.schema();
        let mut rows = rows(&["Name"], &[&["Acme"], &["Acme"], &[""]]);

        validate(&schema, &mut rows, &ExistingKeys::default());
        let stats = ImportStats::from_rows(&rows);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.duplicates, 1);
        assert!(rows[0].is_valid());
        assert_eq!(
            rows[1].errors.get(&FieldId::Name),
            Some(&FieldError::Duplicate(DuplicateSource::InBatch))
        );
        assert_eq!(rows[2].errors.get(&FieldId::Name), Some(&FieldError::Required));
    }

    #[test]
    fn test_blank_name_after_trim_is_required() {
        let schema = EntityKind::Brand.schema();
        let mut rows = rows(&["Brand Name"], &[&["   "]]);

        validate(&schema, &mut rows, &ExistingKeys::default());

        assert_eq!(rows[0].status, RowStatus::Error);
        assert_eq!(rows[0].errors.get(&FieldId::Name), Some(&FieldError::Required));
    }

    #[test]
    fn test_duplicate_detection_is_normalized() {
        let schema = EntityKind::Category.schema();
        let mut rows = rows(&["Name"], &[&["Home & Garden"], &["home garden"]]);

        validate(&schema, &mut rows, &ExistingKeys::default());

        assert!(rows[0].is_valid());
        assert!(rows[1].is_duplicate());
    }

    #[test]
    fn test_existing_keys_flag_every_occurrence() {
        let schema = EntityKind::Vendor.schema();
        let existing = ExistingKeys::new(["Globex Corp"]);
        let mut rows = rows(&["Vendor Name"], &[&["globex corp"], &["GLOBEX CORP"], &["Initech"]]);

        validate(&schema, &mut rows, &existing);
        let stats = ImportStats::from_rows(&rows);

        assert_eq!(
            rows[0].errors.get(&FieldId::Name),
            Some(&FieldError::Duplicate(DuplicateSource::Existing))
        );
        assert_eq!(
            rows[1].errors.get(&FieldId::Name),
            Some(&FieldError::Duplicate(DuplicateSource::Existing))
        );
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.duplicates, 2);
    }

    #[test]
    fn test_existing_keys_from_records() {
        let schema = EntityKind::Product.schema();
        let records = vec![
            serde_json::json!({"sku": "AR-B001-US", "title": "Lamp"}),
            serde_json::json!({"title": "No SKU"}),
        ];
        let existing = ExistingKeys::from_records(&schema, &records);

        assert_eq!(existing.len(), 1);
        assert!(existing.contains(&normalize_key("AR-B001-US")));
    }

    #[test]
    fn test_product_sku_derivation_and_duplicates() {
        let schema = EntityKind::Product.schema();
        let mut rows = rows(
            &["Title", "ASIN", "Condition", "Price"],
            &[
                &["Lamp", "B001", "Used", "10"],
                &["Lamp again", "B001", "used", "12"],
                &["Desk", "B002", "Unknown", "30"],
                &["Chair", "", "Used", "5"],
            ],
        );

        validate(&schema, &mut rows, &ExistingKeys::default());

        assert_eq!(rows[0].value(FieldId::Sku), "AR-B001-US");
        assert_eq!(rows[0].display_key, "AR-B001-US");
        assert!(rows[0].is_valid());
        assert_eq!(
            rows[1].errors.get(&FieldId::Sku),
            Some(&FieldError::Duplicate(DuplicateSource::InBatch))
        );
        assert_eq!(rows[2].value(FieldId::Sku), "AR-B002");
        assert!(rows[2].is_valid());
        assert_eq!(rows[3].errors.get(&FieldId::Sku), Some(&FieldError::Required));
    }

    #[test]
    fn test_explicit_sku_wins_over_derivation() {
        let schema = EntityKind::Product.schema();
        let mut rows = rows(
            &["Title", "ASIN", "Condition", "SKU", "Price"],
            &[&["Lamp", "B001", "Used", "CUSTOM-1", "10"]],
        );

        validate(&schema, &mut rows, &ExistingKeys::default());

        assert_eq!(rows[0].value(FieldId::Sku), "CUSTOM-1");
    }

    #[test]
    fn test_numeric_rules() {
        let schema = EntityKind::Product.schema();
        let mut rows = rows(
            &["Title", "ASIN", "Price", "Stock"],
            &[
                &["A", "B1", "0", "0"],
                &["B", "B2", "abc", "-1"],
                &["C", "B3", "NaN", ""],
                &["D", "B4", "", "3"],
                &["E", "B5", "4.99", "7"],
            ],
        );

        validate(&schema, &mut rows, &ExistingKeys::default());

        assert_eq!(rows[0].errors.get(&FieldId::Price), Some(&FieldError::NotPositive));
        assert!(rows[0].errors.get(&FieldId::Stock).is_none());
        assert_eq!(
            rows[1].errors.get(&FieldId::Price),
            Some(&FieldError::InvalidNumber("abc".to_string()))
        );
        assert_eq!(rows[1].errors.get(&FieldId::Stock), Some(&FieldError::Negative));
        assert!(matches!(
            rows[2].errors.get(&FieldId::Price),
            Some(FieldError::InvalidNumber(_))
        ));
        assert_eq!(rows[3].errors.get(&FieldId::Price), Some(&FieldError::Required));
        assert!(rows[4].is_valid());
        assert_eq!(rows[4].value(FieldId::Price), "4.99");
    }

    #[test]
    fn test_validate_is_idempotent() {
        let schema = EntityKind::Employee.schema();
        let existing = ExistingKeys::new(["555-0100"]);
        let mut rows = rows(
            &["Name", "Phone"],
            &[&["Ann", "555-0100"], &["Bob", "555-0101"], &["Cy", "555 0101"], &["", ""]],
        );

        validate(&schema, &mut rows, &existing);
        let first = rows.clone();
        validate(&schema, &mut rows, &existing);

        assert_eq!(first, rows);
    }

    #[test]
    fn test_status_matches_errors_and_stats_balance() {
        let schema = EntityKind::Employee.schema();
        let mut rows = rows(
            &["Name", "Phone", "Salary"],
            &[
                &["Ann", "1", "100"],
                &["", "2", ""],
                &["Cy", "", "-5"],
                &["Dee", "1", "x"],
            ],
        );

        validate(&schema, &mut rows, &ExistingKeys::default());
        let stats = ImportStats::from_rows(&rows);

        for row in &rows {
            assert_eq!(row.is_valid(), row.errors.is_empty());
        }
        assert_eq!(stats.valid + stats.errors, stats.total);
    }
}
