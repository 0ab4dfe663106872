//! Entity kinds and the schema descriptors that drive the import pipeline
//!
//! Each importable entity is described by an [`EntitySchema`]: which columns it
//! reads, how each is validated, which field must be unique, and whether the
//! backend takes the rows as one batch or one request per row.

use serde::{Deserialize, Serialize};

use super::field::{FieldId, FieldRule};

/// Entities that can be created from a spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Category,
    Brand,
    Employee,
    Vendor,
}

/// How valid rows reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// A single bulk-create request carrying every row
    Batch,
    /// One create request per row, sequentially, tolerating failures
    PerRow,
}

/// One column the schema reads from the sheet
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub id: FieldId,
    /// Header written to import templates
    pub label: &'static str,
    /// Normalized header keys that identify this column, in priority order
    pub keys: &'static [&'static str],
    pub rule: FieldRule,
}

/// Per-entity descriptor for the generic import pipeline
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    /// Field whose normalized value must be unique in the batch and on the server
    pub unique: FieldId,
    /// Field shown as the row's display key in previews
    pub display: FieldId,
    pub submit: SubmitMode,
}

impl EntitySchema {
    pub fn field(&self, id: FieldId) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Template headers, in schema order
    pub fn labels(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.label).collect()
    }
}

const fn field(
    id: FieldId,
    label: &'static str,
    keys: &'static [&'static str],
    rule: FieldRule,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        keys,
        rule,
    }
}

static CATEGORY_FIELDS: &[FieldSpec] = &[
    field(
        FieldId::Name,
        "Name",
        &["name", "categoryname", "category", "title"],
        FieldRule::RequiredText,
    ),
    field(
        FieldId::Description,
        "Description",
        &["description", "desc"],
        FieldRule::OptionalText,
    ),
];

static BRAND_FIELDS: &[FieldSpec] = &[
    field(
        FieldId::Name,
        "Name",
        &["name", "brandname", "brand", "title"],
        FieldRule::RequiredText,
    ),
    field(
        FieldId::Description,
        "Description",
        &["description", "desc"],
        FieldRule::OptionalText,
    ),
];

static PRODUCT_FIELDS: &[FieldSpec] = &[
    field(
        FieldId::Title,
        "Title",
        &["title", "name", "productname", "producttitle"],
        FieldRule::RequiredText,
    ),
    field(FieldId::Asin, "ASIN", &["asin"], FieldRule::OptionalText),
    field(
        FieldId::Condition,
        "Condition",
        &["condition", "itemcondition"],
        FieldRule::OptionalText,
    ),
    field(FieldId::Sku, "SKU", &["sku"], FieldRule::DerivedSku),
    field(
        FieldId::Price,
        "Price",
        &["price", "saleprice", "sellingprice", "unitprice"],
        FieldRule::PositiveNumber,
    ),
    field(
        FieldId::Stock,
        "Stock",
        &["stock", "quantity", "qty", "stockquantity"],
        FieldRule::NonNegativeNumber { required: false },
    ),
    field(
        FieldId::Category,
        "Category",
        &["category", "categoryname"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::Brand,
        "Brand",
        &["brand", "brandname"],
        FieldRule::OptionalText,
    ),
];

static EMPLOYEE_FIELDS: &[FieldSpec] = &[
    field(
        FieldId::Name,
        "Name",
        &["name", "fullname", "employeename"],
        FieldRule::RequiredText,
    ),
    field(
        FieldId::Phone,
        "Phone",
        &["phone", "phonenumber", "mobile", "contactnumber"],
        FieldRule::RequiredText,
    ),
    field(
        FieldId::Email,
        "Email",
        &["email", "emailaddress"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::Role,
        "Role",
        &["role", "position", "designation"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::Salary,
        "Salary",
        &["salary", "monthlysalary"],
        FieldRule::NonNegativeNumber { required: false },
    ),
];

static VENDOR_FIELDS: &[FieldSpec] = &[
    field(
        FieldId::Name,
        "Name",
        &["name", "vendorname", "company", "companyname"],
        FieldRule::RequiredText,
    ),
    field(
        FieldId::Phone,
        "Phone",
        &["phone", "phonenumber", "mobile"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::Email,
        "Email",
        &["email", "emailaddress"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::Address,
        "Address",
        &["address", "location"],
        FieldRule::OptionalText,
    ),
    field(
        FieldId::ContactPerson,
        "Contact Person",
        &["contactperson", "contact", "contactname"],
        FieldRule::OptionalText,
    ),
];

impl EntityKind {
    pub fn schema(&self) -> EntitySchema {
        match self {
            EntityKind::Product => EntitySchema {
                kind: *self,
                fields: PRODUCT_FIELDS,
                unique: FieldId::Sku,
                display: FieldId::Sku,
                submit: SubmitMode::Batch,
            },
            EntityKind::Category => EntitySchema {
                kind: *self,
                fields: CATEGORY_FIELDS,
                unique: FieldId::Name,
                display: FieldId::Name,
                submit: SubmitMode::Batch,
            },
            EntityKind::Brand => EntitySchema {
                kind: *self,
                fields: BRAND_FIELDS,
                unique: FieldId::Name,
                display: FieldId::Name,
                submit: SubmitMode::Batch,
            },
            EntityKind::Employee => EntitySchema {
                kind: *self,
                fields: EMPLOYEE_FIELDS,
                unique: FieldId::Phone,
                display: FieldId::Name,
                submit: SubmitMode::PerRow,
            },
            EntityKind::Vendor => EntitySchema {
                kind: *self,
                fields: VENDOR_FIELDS,
                unique: FieldId::Name,
                display: FieldId::Name,
                submit: SubmitMode::PerRow,
            },
        }
    }

    /// REST collection name (e.g., "categories")
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Category => "categories",
            EntityKind::Brand => "brands",
            EntityKind::Employee => "employees",
            EntityKind::Vendor => "vendors",
        }
    }

    /// Human-readable plural for messages
    pub fn plural(&self) -> &'static str {
        self.collection()
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Product => write!(f, "Product"),
            EntityKind::Category => write!(f, "Category"),
            EntityKind::Brand => write!(f, "Brand"),
            EntityKind::Employee => write!(f, "Employee"),
            EntityKind::Vendor => write!(f, "Vendor"),
        }
    }
}
