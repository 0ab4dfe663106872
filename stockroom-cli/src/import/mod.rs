//! Spreadsheet import pipeline
//!
//! parse file -> normalize headers -> validate rows (duplicates against the
//! batch and the server snapshot) -> preview and edit -> submit valid rows.

pub mod excel;
pub mod normalize;
pub mod session;
pub mod sku;
pub mod submit;
pub mod types;
pub mod validate;

pub use session::{ImportSession, SessionError, SessionState};
pub use submit::{SubmitError, SubmitReport};
pub use types::{EntityKind, ImportStats, RowStatus};
pub use validate::ExistingKeys;
