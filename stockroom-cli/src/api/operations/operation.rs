//! Core Operation types for backend requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single request against the inventory REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Fetch every record of a collection
    List {
        /// Collection name (e.g., "products", "purchase-orders")
        collection: String,
    },
    /// Create one record
    Create {
        /// Collection name
        collection: String,
        /// Create payload as JSON
        data: Value,
    },
    /// Create many records in a single request
    /// POST /<collection>/bulk with a JSON array body
    CreateBulk {
        /// Collection name
        collection: String,
        /// One create payload per record
        records: Vec<Value>,
    },
}

/// Result of executing an Operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation that was executed
    pub operation: Operation,
    /// Whether the backend accepted the request
    pub success: bool,
    /// Response body (parsed JSON, or a string when not JSON)
    pub data: Option<Value>,
    /// Error message if the request was rejected
    pub error: Option<String>,
    /// HTTP status code from the response
    pub status_code: Option<u16>,
}

impl Operation {
    pub fn list(collection: impl Into<String>) -> Self {
        Self::List {
            collection: collection.into(),
        }
    }

    pub fn create(collection: impl Into<String>, data: Value) -> Self {
        Self::Create {
            collection: collection.into(),
            data,
        }
    }

    pub fn create_bulk(collection: impl Into<String>, records: Vec<Value>) -> Self {
        Self::CreateBulk {
            collection: collection.into(),
            records,
        }
    }

    /// Get the collection this operation targets
    pub fn collection(&self) -> &str {
        match self {
            Self::List { collection } => collection,
            Self::Create { collection, .. } => collection,
            Self::CreateBulk { collection, .. } => collection,
        }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::List { .. } => "GET",
            Self::Create { .. } => "POST",
            Self::CreateBulk { .. } => "POST",
        }
    }

    /// Path below the collection root ("" or "/bulk")
    pub fn path_suffix(&self) -> &'static str {
        match self {
            Self::CreateBulk { .. } => "/bulk",
            _ => "",
        }
    }

    /// Request body, if the operation sends one
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::List { .. } => None,
            Self::Create { data, .. } => Some(data.clone()),
            Self::CreateBulk { records, .. } => Some(Value::Array(records.clone())),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} /{}{}",
            self.http_method(),
            self.collection(),
            self.path_suffix()
        )
    }
}

impl OperationResult {
    /// Create a new successful result
    pub fn success(operation: Operation, data: Option<Value>, status_code: Option<u16>) -> Self {
        Self {
            operation,
            success: true,
            data,
            error: None,
            status_code,
        }
    }

    /// Create a new error result
    pub fn error(operation: Operation, error: String, status_code: Option<u16>) -> Self {
        Self {
            operation,
            success: false,
            data: None,
            error: Some(error),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Error text including the status code when known
    pub fn error_message(&self) -> String {
        let message = self.error.clone().unwrap_or_else(|| "Unknown error".to_string());
        match self.status_code {
            Some(code) => format!("HTTP {}: {}", code, message),
            None => message,
        }
    }

    /// Get the result data, returning an error if the operation failed
    pub fn into_result(self) -> Result<Value, String> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(self.error_message())
        }
    }
}

/// Pull the record array out of a list response.
/// Accepts a bare array or an object wrapping it under `data`, `items` or `results`.
pub fn extract_records(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut obj) => ["data", "items", "results"]
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_routing() {
        let bulk = Operation::create_bulk("products", vec![json!({"title": "Lamp"})]);
        assert_eq!(bulk.http_method(), "POST");
        assert_eq!(bulk.to_string(), "POST /products/bulk");
        assert_eq!(bulk.body(), Some(json!([{"title": "Lamp"}])));

        let list = Operation::list("vendors");
        assert_eq!(list.to_string(), "GET /vendors");
        assert!(list.body().is_none());
    }

    #[test]
    fn test_extract_records() {
        assert_eq!(extract_records(json!([1, 2])), Some(vec![json!(1), json!(2)]));
        assert_eq!(
            extract_records(json!({"data": [{"name": "A"}], "total": 1})),
            Some(vec![json!({"name": "A"})])
        );
        assert_eq!(extract_records(json!({"results": []})), Some(vec![]));
        assert_eq!(extract_records(json!({"message": "nope"})), None);
        assert_eq!(extract_records(json!("text")), None);
    }

    #[test]
    fn test_error_message_includes_status() {
        let result = OperationResult::error(
            Operation::create("employees", json!({})),
            "phone already registered".to_string(),
            Some(409),
        );
        assert_eq!(result.error_message(), "HTTP 409: phone already registered");
        assert!(result.into_result().is_err());
    }
}
