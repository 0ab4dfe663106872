//! Aggregate counts over an import row set

use serde::Serialize;

use super::row::ImportRow;

/// Derived counters; always recomputed from the rows, never stored on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub valid: usize,
    pub errors: usize,
    /// Rows carrying at least one duplicate error (subset of `errors`)
    pub duplicates: usize,
}

impl ImportStats {
    pub fn from_rows(rows: &[ImportRow]) -> Self {
        let mut stats = ImportStats {
            total: rows.len(),
            ..Default::default()
        };

        for row in rows {
            if row.is_valid() {
                stats.valid += 1;
            } else {
                stats.errors += 1;
            }
            if row.is_duplicate() {
                stats.duplicates += 1;
            }
        }

        stats
    }
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} total, {} valid, {} with errors ({} duplicates)",
            self.total, self.valid, self.errors, self.duplicates
        )
    }
}
