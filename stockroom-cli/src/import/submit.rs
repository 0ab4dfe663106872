//! Bulk submission of validated rows
//!
//! Only rows whose status is `valid` are sent. Batch entities go out as one
//! bulk-create request; per-row entities are posted one at a time, in order,
//! and a rejected row is counted without stopping the loop. Nothing is
//! retried automatically.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::api::{EntityApi, Operation};

use super::types::{EntitySchema, ImportRow, SubmitMode};

/// Submission failures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SubmitError {
    /// Nothing valid to send; no request was made
    NoValidRows,
    /// The backend rejected (or never answered) one row of a per-row import
    Row {
        line: usize,
        key: String,
        message: String,
    },
    /// The backend rejected (or never answered) a whole bulk request
    Batch { rows: usize, message: String },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::NoValidRows => write!(f, "No valid rows to import"),
            SubmitError::Row { line, key, message } => {
                write!(f, "Row {} ({}): {}", line, key, message)
            }
            SubmitError::Batch { rows, message } => {
                write!(f, "Bulk create of {} rows failed: {}", rows, message)
            }
        }
    }
}

impl std::error::Error for SubmitError {}

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<SubmitError>,
}

impl SubmitReport {
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}

/// Create payload for a row: typed field values only, no annotations.
/// Numeric fields become JSON numbers; empty optional fields are omitted.
pub fn build_payload(schema: &EntitySchema, row: &ImportRow) -> Value {
    let mut payload = Map::new();

    for spec in schema.fields {
        let Some(raw) = row.values.get(&spec.id) else {
            continue;
        };

        let value = if spec.rule.is_numeric() {
            number_value(raw).unwrap_or_else(|| Value::String(raw.clone()))
        } else {
            Value::String(raw.clone())
        };
        payload.insert(spec.id.payload_key().to_string(), value);
    }

    Value::Object(payload)
}

fn number_value(raw: &str) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Send every valid row to the backend and report the counts.
///
/// Errors with [`SubmitError::NoValidRows`] before any request when there is
/// nothing to send. The collection's cached list is invalidated afterwards,
/// whatever the outcome.
pub async fn submit_rows(
    api: &dyn EntityApi,
    schema: &EntitySchema,
    rows: &[ImportRow],
) -> Result<SubmitReport, SubmitError> {
    let valid: Vec<&ImportRow> = rows.iter().filter(|r| r.is_valid()).collect();
    if valid.is_empty() {
        return Err(SubmitError::NoValidRows);
    }

    let collection = schema.kind.collection();
    let report = match schema.submit {
        SubmitMode::Batch => submit_batch(api, schema, &valid).await,
        SubmitMode::PerRow => submit_each(api, schema, &valid).await,
    };

    api.invalidate(collection);
    log::info!(
        "Submitted {} {}: {} succeeded, {} failed",
        report.attempted,
        collection,
        report.succeeded,
        report.failed
    );
    Ok(report)
}

async fn submit_batch(
    api: &dyn EntityApi,
    schema: &EntitySchema,
    rows: &[&ImportRow],
) -> SubmitReport {
    let records: Vec<Value> = rows.iter().map(|r| build_payload(schema, r)).collect();
    let operation = Operation::create_bulk(schema.kind.collection(), records);

    let failure = match api.execute(&operation).await {
        Ok(result) if result.is_success() => None,
        Ok(result) => Some(result.error_message()),
        Err(e) => Some(format!("{:#}", e)),
    };

    match failure {
        None => SubmitReport {
            attempted: rows.len(),
            succeeded: rows.len(),
            failed: 0,
            errors: Vec::new(),
        },
        Some(message) => {
            log::error!("Bulk create failed: {}", message);
            SubmitReport {
                attempted: rows.len(),
                succeeded: 0,
                failed: rows.len(),
                errors: vec![SubmitError::Batch {
                    rows: rows.len(),
                    message,
                }],
            }
        }
    }
}

async fn submit_each(
    api: &dyn EntityApi,
    schema: &EntitySchema,
    rows: &[&ImportRow],
) -> SubmitReport {
    let mut report = SubmitReport {
        attempted: rows.len(),
        succeeded: 0,
        failed: 0,
        errors: Vec::new(),
    };

    for row in rows {
        let operation = Operation::create(schema.kind.collection(), build_payload(schema, row));

        // Strictly sequential: the next row is only sent once this one settled
        let failure = match api.execute(&operation).await {
            Ok(result) if result.is_success() => None,
            Ok(result) => Some(result.error_message()),
            Err(e) => Some(format!("{:#}", e)),
        };

        match failure {
            None => report.succeeded += 1,
            Some(message) => {
                log::warn!("Row {} rejected: {}", row.line, message);
                report.failed += 1;
                report.errors.push(SubmitError::Row {
                    line: row.line,
                    key: row.display_key.clone(),
                    message,
                });
            }
        }
    }

    report
}
