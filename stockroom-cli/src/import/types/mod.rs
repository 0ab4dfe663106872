//! Core types shared by the import pipeline

pub mod entity;
pub mod field;
pub mod row;
pub mod stats;

pub use entity::{EntityKind, EntitySchema, FieldSpec, SubmitMode};
pub use field::{DuplicateSource, FieldError, FieldId, FieldRule};
pub use row::{ImportRow, RowStatus};
pub use stats::ImportStats;
