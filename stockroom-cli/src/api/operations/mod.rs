//! Backend Operations Module
//!
//! Every request the tool makes is an [`Operation`]; executing one yields an
//! [`OperationResult`] carrying the backend's verdict.

pub mod operation;

pub use operation::{Operation, OperationResult, extract_records};
