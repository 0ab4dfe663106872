//! Import session state machine
//!
//! ```text
//! idle -> file-selected -> validated -> (edit -> validated)* -> submitting
//!      -> completed | completed-with-errors
//! ```
//!
//! A parse failure drops the session back to idle with no rows. Dropping the
//! session discards everything; nothing carries over to the next one.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::EntityApi;

use super::excel::{ParseError, read_import_file};
use super::normalize::{find_column, normalize_key};
use super::submit::{SubmitError, SubmitReport, submit_rows};
use super::types::{EntityKind, EntitySchema, ImportRow, ImportStats};
use super::validate::{ExistingKeys, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FileSelected,
    Validated,
    Submitting,
    Completed,
    CompletedWithErrors,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::FileSelected => write!(f, "file-selected"),
            SessionState::Validated => write!(f, "validated"),
            SessionState::Submitting => write!(f, "submitting"),
            SessionState::Completed => write!(f, "completed"),
            SessionState::CompletedWithErrors => write!(f, "completed-with-errors"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Action not allowed in the current state
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
    Parse(ParseError),
    /// No data row with this 1-based line number
    UnknownRow(usize),
    /// No file column matches this header, even after normalization
    UnknownColumn(String),
    Submit(SubmitError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidState { action, state } => {
                write!(f, "Cannot {} while the import is {}", action, state)
            }
            SessionError::Parse(e) => write!(f, "{}", e),
            SessionError::UnknownRow(line) => write!(f, "No row {} in the import", line),
            SessionError::UnknownColumn(header) => {
                write!(f, "No column '{}' in the import", header)
            }
            SessionError::Submit(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self {
        SessionError::Parse(e)
    }
}

impl From<SubmitError> for SessionError {
    fn from(e: SubmitError) -> Self {
        SessionError::Submit(e)
    }
}

/// One import attempt for one entity kind
#[derive(Debug)]
pub struct ImportSession {
    schema: EntitySchema,
    state: SessionState,
    file: Option<PathBuf>,
    headers: Vec<String>,
    rows: Vec<ImportRow>,
    existing: ExistingKeys,
    report: Option<SubmitReport>,
}

impl ImportSession {
    /// Start a session against a known snapshot of existing keys
    pub fn new(kind: EntityKind, existing: ExistingKeys) -> Self {
        Self {
            schema: kind.schema(),
            state: SessionState::Idle,
            file: None,
            headers: Vec::new(),
            rows: Vec::new(),
            existing,
            report: None,
        }
    }

    /// Start a session, fetching the existing-key snapshot from the backend once
    pub async fn open(api: &dyn EntityApi, kind: EntityKind) -> anyhow::Result<Self> {
        let records = api
            .list(kind.collection())
            .await
            .with_context(|| format!("Failed to fetch existing {}", kind.plural()))?;
        let existing = ExistingKeys::from_records(&kind.schema(), &records);
        if existing.is_empty() {
            log::info!("No existing {} on the server", kind.plural());
        } else {
            log::info!(
                "Loaded {} existing {} keys for duplicate checks",
                existing.len(),
                kind.plural()
            );
        }
        Ok(Self::new(kind, existing))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    pub fn report(&self) -> Option<&SubmitReport> {
        self.report.as_ref()
    }

    /// Template labels of required fields with no matching column in the file
    pub fn missing_columns(&self) -> Vec<&'static str> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        self.schema
            .fields
            .iter()
            .filter(|spec| spec.rule.needs_column())
            .filter(|spec| find_column(&self.headers, spec).is_none())
            .map(|spec| spec.label)
            .collect()
    }

    pub fn stats(&self) -> ImportStats {
        ImportStats::from_rows(&self.rows)
    }

    fn require(&self, action: &'static str, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    /// Pick the file to import; allowed until parsing succeeded
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        self.require(
            "select a file",
            &[SessionState::Idle, SessionState::FileSelected],
        )?;
        self.file = Some(path.into());
        self.state = SessionState::FileSelected;
        Ok(())
    }

    /// Parse the selected file and validate every row
    pub fn parse(&mut self) -> Result<ImportStats, SessionError> {
        self.require("parse", &[SessionState::FileSelected])?;
        let Some(path) = self.file.clone() else {
            return Err(SessionError::InvalidState {
                action: "parse",
                state: self.state,
            });
        };

        match read_import_file(&path) {
            Ok(sheet) => {
                self.headers = sheet.headers;
                self.rows = sheet.rows;
                self.state = SessionState::Validated;
                Ok(self.revalidate())
            }
            Err(e) => {
                self.reset();
                Err(e.into())
            }
        }
    }

    /// `select_file` then `parse`
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<ImportStats, SessionError> {
        self.select_file(path)?;
        self.parse()
    }

    /// Edit one cell of a data row, then re-validate the whole set: duplicate
    /// state of other rows may change. `line` is 1-based. `header` names a
    /// file column, exactly or up to `normalize_key`.
    pub fn edit_cell(
        &mut self,
        line: usize,
        header: &str,
        value: impl Into<String>,
    ) -> Result<ImportStats, SessionError> {
        self.require("edit cells", &[SessionState::Validated])?;

        let column = self.resolve_header(header)?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.line == line)
            .ok_or(SessionError::UnknownRow(line))?;
        row.set_cell(&column, value);

        Ok(self.revalidate())
    }

    /// File header for a user-typed column name
    fn resolve_header(&self, header: &str) -> Result<String, SessionError> {
        if let Some(exact) = self.headers.iter().find(|h| h.as_str() == header) {
            return Ok(exact.clone());
        }
        let key = normalize_key(header);
        if !key.is_empty() {
            if let Some(found) = self.headers.iter().find(|h| normalize_key(h) == key) {
                return Ok(found.clone());
            }
        }
        Err(SessionError::UnknownColumn(header.to_string()))
    }

    /// Re-run validation over all rows
    pub fn revalidate(&mut self) -> ImportStats {
        validate(&self.schema, &mut self.rows, &self.existing);
        self.stats()
    }

    /// Send the valid rows. With zero valid rows nothing is sent and the
    /// session stays editable.
    pub async fn submit(&mut self, api: &dyn EntityApi) -> Result<&SubmitReport, SessionError> {
        self.require("submit", &[SessionState::Validated])?;
        if self.stats().valid == 0 {
            return Err(SubmitError::NoValidRows.into());
        }

        self.state = SessionState::Submitting;
        let report = match submit_rows(api, &self.schema, &self.rows).await {
            Ok(report) => report,
            Err(e) => {
                self.state = SessionState::Validated;
                return Err(e.into());
            }
        };

        self.state = if report.has_errors() {
            SessionState::CompletedWithErrors
        } else {
            SessionState::Completed
        };
        Ok(self.report.insert(report))
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.file = None;
        self.headers.clear();
        self.rows.clear();
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::submit::tests::FakeApi;
    use crate::import::types::{DuplicateSource, FieldError, FieldId};
    use serde_json::json;

    fn write_csv(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "stockroom-session-{}.csv",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_validates_rows() {
        let path = write_csv("Name\nAcme\nAcme\n\"\"\nTools\n");
        let mut session = ImportSession::new(EntityKind::Category, ExistingKeys::default());

        let stats = session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // the quoted empty line is a blank row and is skipped
        assert_eq!(session.state(), SessionState::Validated);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_parse_error_resets_to_idle() {
        let path = write_csv("Name\n");
        let mut session = ImportSession::new(EntityKind::Brand, ExistingKeys::default());

        let err = session.load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, SessionError::Parse(ParseError::Empty { .. })));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.rows().is_empty());
        assert!(session.headers().is_empty());
    }

    #[test]
    fn test_edit_revalidates_whole_set() {
        let path = write_csv("Name,Description\nAcme,a\nAcme,b\n,c\n");
        let mut session = ImportSession::new(EntityKind::Category, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            session.rows()[1].errors.get(&FieldId::Name),
            Some(&FieldError::Duplicate(DuplicateSource::InBatch))
        );

        // Renaming the first row clears the duplicate flag on the second
        let stats = session.edit_cell(1, "Name", "Globex").unwrap();
        assert!(session.rows()[1].is_valid());
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.duplicates, 0);

        let stats = session.edit_cell(3, "Name", "Tools").unwrap();
        assert_eq!(stats.valid, 3);
        assert_eq!(stats.valid + stats.errors, stats.total);
    }

    #[test]
    fn test_edit_matches_header_loosely() {
        let path = write_csv("Name,Description\nAcme,a\n,b\n");
        let mut session = ImportSession::new(EntityKind::Category, ExistingKeys::default());
        let stats = session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(stats.valid, 1);

        let stats = session.edit_cell(2, "name", "Tools").unwrap();

        assert_eq!(stats.valid, 2);
        assert_eq!(session.headers(), ["Name", "Description"]);
        assert_eq!(session.rows()[1].cell("Name"), Some("Tools"));
        assert_eq!(session.rows()[1].cells.len(), 2);
    }

    #[test]
    fn test_edit_unknown_column() {
        let path = write_csv("Name\nAcme\n");
        let mut session = ImportSession::new(EntityKind::Brand, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let before = session.stats();

        let err = session.edit_cell(1, "Colour", "red").unwrap_err();

        assert_eq!(err, SessionError::UnknownColumn("Colour".to_string()));
        assert_eq!(session.headers(), ["Name"]);
        assert_eq!(session.stats(), before);
        assert_eq!(session.rows()[0].cell("Colour"), None);
    }

    #[test]
    fn test_missing_columns() {
        let path = write_csv("Title,ASIN\nLamp,B001\n");
        let mut session = ImportSession::new(EntityKind::Product, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // SKU derives from the ASIN and stock is optional
        assert_eq!(session.missing_columns(), ["Price"]);
    }

    #[test]
    fn test_edit_unknown_row() {
        let path = write_csv("Name\nAcme\n");
        let mut session = ImportSession::new(EntityKind::Category, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            session.edit_cell(9, "Name", "x").unwrap_err(),
            SessionError::UnknownRow(9)
        );
    }

    #[test]
    fn test_edit_before_parse_is_rejected() {
        let mut session = ImportSession::new(EntityKind::Vendor, ExistingKeys::default());
        let err = session.edit_cell(1, "Name", "x").unwrap_err();

        assert_eq!(
            err,
            SessionError::InvalidState {
                action: "edit cells",
                state: SessionState::Idle
            }
        );
    }

    #[tokio::test]
    async fn test_open_uses_server_snapshot() {
        let api = FakeApi {
            records: vec![json!({"name": "Acme", "id": 1})],
            ..Default::default()
        };
        let path = write_csv("Name\nacme\nGlobex\n");

        let mut session = ImportSession::open(&api, EntityKind::Brand).await.unwrap();
        let stats = session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(stats.valid, 1);
        assert!(session.missing_columns().is_empty());
        assert_eq!(
            session.rows()[0].errors.get(&FieldId::Name),
            Some(&FieldError::Duplicate(DuplicateSource::Existing))
        );
    }

    #[tokio::test]
    async fn test_submit_zero_valid_rows_keeps_session_editable() {
        let api = FakeApi::default();
        let path = write_csv("Name,Phone\n,123\n");
        let mut session = ImportSession::new(EntityKind::Employee, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let err = session.submit(&api).await.unwrap_err();

        assert_eq!(session.missing_columns(), Vec::<&str>::new());
        assert_eq!(err, SessionError::Submit(SubmitError::NoValidRows));
        assert_eq!(session.state(), SessionState::Validated);
        assert!(api.operations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_completes_with_errors() {
        let api = FakeApi {
            reject_value: Some("Initech".to_string()),
            ..Default::default()
        };
        let path = write_csv("Vendor Name,Phone\nGlobex,1\nInitech,2\n");
        let mut session = ImportSession::new(EntityKind::Vendor, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let report = session.submit(&api).await.unwrap().clone();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(session.state(), SessionState::CompletedWithErrors);
        assert!(session.edit_cell(1, "Phone", "9").is_err());
    }

    #[tokio::test]
    async fn test_submit_completes() {
        let api = FakeApi::default();
        let path = write_csv("Title,ASIN,Condition,Price\nLamp,B001,Used,10\n");
        let mut session = ImportSession::new(EntityKind::Product, ExistingKeys::default());
        session.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        session.submit(&api).await.unwrap();

        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(api.invalidated.lock().unwrap().as_slice(), ["products"]);
    }
}
