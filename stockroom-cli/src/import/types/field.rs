//! Field identifiers, validation rules and per-field errors

use serde::{Deserialize, Serialize};

/// Every field any import schema knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Name,
    Title,
    Description,
    Asin,
    Condition,
    Sku,
    Price,
    Stock,
    Category,
    Brand,
    Phone,
    Email,
    Role,
    Salary,
    Address,
    ContactPerson,
}

impl FieldId {
    /// Key used for this field in create payloads and backend records
    pub fn payload_key(&self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Title => "title",
            FieldId::Description => "description",
            FieldId::Asin => "asin",
            FieldId::Condition => "condition",
            FieldId::Sku => "sku",
            FieldId::Price => "price",
            FieldId::Stock => "stock",
            FieldId::Category => "category",
            FieldId::Brand => "brand",
            FieldId::Phone => "phone",
            FieldId::Email => "email",
            FieldId::Role => "role",
            FieldId::Salary => "salary",
            FieldId::Address => "address",
            FieldId::ContactPerson => "contact_person",
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.payload_key())
    }
}

/// How a field's raw cell value is checked and encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Non-empty after trim
    RequiredText,
    /// Anything, including empty
    OptionalText,
    /// Finite number strictly greater than zero, required
    PositiveNumber,
    /// Finite number greater than or equal to zero
    NonNegativeNumber { required: bool },
    /// Product SKU: explicit column or derived from ASIN + condition
    DerivedSku,
}

impl FieldRule {
    /// Whether the value is sent to the backend as a JSON number
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldRule::PositiveNumber | FieldRule::NonNegativeNumber { .. }
        )
    }

    /// Whether every row needs a value read from its own column
    pub fn needs_column(&self) -> bool {
        matches!(
            self,
            FieldRule::RequiredText
                | FieldRule::PositiveNumber
                | FieldRule::NonNegativeNumber { required: true }
        )
    }
}

/// Where a duplicate key was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSource {
    /// An earlier row of the same file carries the key
    InBatch,
    /// The backend already has a record with the key
    Existing,
}

/// Validation failure recorded against a single field of a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FieldError {
    Required,
    InvalidNumber(String),
    NotPositive,
    Negative,
    Duplicate(DuplicateSource),
}

impl FieldError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, FieldError::Duplicate(_))
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Required => write!(f, "Required"),
            FieldError::InvalidNumber(raw) => write!(f, "'{}' is not a valid number", raw),
            FieldError::NotPositive => write!(f, "Must be greater than zero"),
            FieldError::Negative => write!(f, "Must not be negative"),
            FieldError::Duplicate(DuplicateSource::InBatch) => write!(f, "Duplicate"),
            FieldError::Duplicate(DuplicateSource::Existing) => {
                write!(f, "Duplicate (already exists)")
            }
        }
    }
}

impl std::error::Error for FieldError {}
