//! Client-side search, sort and pagination over fetched collections

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::import::EntityKind;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Collections the dashboard lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Products,
    Categories,
    Brands,
    Employees,
    Vendors,
    Sales,
    PurchaseOrders,
    Expenses,
}

impl Resource {
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Brands => "brands",
            Resource::Employees => "employees",
            Resource::Vendors => "vendors",
            Resource::Sales => "sales",
            Resource::PurchaseOrders => "purchase-orders",
            Resource::Expenses => "expenses",
        }
    }

    /// Importable entity behind this resource, if any
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Resource::Products => Some(EntityKind::Product),
            Resource::Categories => Some(EntityKind::Category),
            Resource::Brands => Some(EntityKind::Brand),
            Resource::Employees => Some(EntityKind::Employee),
            Resource::Vendors => Some(EntityKind::Vendor),
            Resource::Sales | Resource::PurchaseOrders | Resource::Expenses => None,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection())
    }
}

/// What to show of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub descending: bool,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            descending: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a filtered, sorted collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<Value>,
    pub page: usize,
    pub page_count: usize,
    /// Records matching the search, across all pages
    pub total: usize,
}

/// Filter, sort, then cut out the requested page
pub fn apply(records: Vec<Value>, query: &ListQuery) -> Page {
    let mut matched: Vec<Value> = match query.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            records
                .into_iter()
                .filter(|r| matches_search(r, &needle))
                .collect()
        }
        _ => records,
    };

    if let Some(ref field) = query.sort {
        sort_records(&mut matched, field, query.descending);
    }

    paginate(matched, query.page, query.page_size)
}

/// Case-insensitive substring match over every scalar field.
/// `needle` must already be lowercase.
pub fn matches_search(record: &Value, needle: &str) -> bool {
    match record {
        Value::Object(obj) => obj.values().any(|v| scalar_contains(v, needle)),
        other => scalar_contains(other, needle),
    }
}

fn scalar_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Bool(b) => b.to_string().contains(needle),
        _ => false,
    }
}

/// Stable sort by one field. Missing and null values go last in both
/// directions.
pub fn sort_records(records: &mut [Value], field: &str, descending: bool) {
    records.sort_by(|a, b| {
        let left = a.get(field).filter(|v| !v.is_null());
        let right = b.get(field).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = compare_values(l, r);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
        }
    });
}

/// Numbers sort before text, so mixed columns still order consistently
fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => sort_text(left).cmp(&sort_text(right)),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

/// Cut out a 1-based page. A page past the end is empty.
pub fn paginate(records: Vec<Value>, page: usize, page_size: usize) -> Page {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = records.len();
    let page_count = total.div_ceil(page_size);

    let items = records
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_count,
        total,
    }
}
