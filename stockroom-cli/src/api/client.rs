//! HTTP client for the inventory REST API

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::config::ClientConfig;
use super::operations::{Operation, OperationResult, extract_records};

/// Seam between the import/list logic and the transport
#[async_trait]
pub trait EntityApi: Send + Sync {
    /// Execute one operation. `Err` means the request never got an answer;
    /// a backend rejection is an `Ok` result with `success == false`.
    async fn execute(&self, operation: &Operation) -> Result<OperationResult>;

    /// Drop any cached list of this collection
    fn invalidate(&self, collection: &str);

    /// Fetch all records of a collection
    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let result = self.execute(&Operation::list(collection)).await?;
        let body = result
            .into_result()
            .map_err(|e| anyhow::anyhow!("Failed to list {}: {}", collection, e))?;
        extract_records(body)
            .with_context(|| format!("Unexpected list response shape for {}", collection))
    }
}

/// reqwest-backed client with a per-collection list cache
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: Mutex<HashMap<String, Value>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn cached(&self, collection: &str) -> Option<Value> {
        self.cache.lock().ok()?.get(collection).cloned()
    }

    fn store(&self, collection: &str, body: &Value) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(collection.to_string(), body.clone());
        }
    }

    async fn send(&self, operation: &Operation) -> Result<OperationResult> {
        let url = self
            .config
            .url_for(operation.collection(), operation.path_suffix());
        let method = match operation {
            Operation::List { .. } => Method::GET,
            Operation::Create { .. } | Operation::CreateBulk { .. } => Method::POST,
        };

        log::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = operation.body() {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed: {}", operation))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {}", operation))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(OperationResult::success(
                operation.clone(),
                Some(body),
                Some(status.as_u16()),
            ))
        } else {
            log::warn!("{} rejected with {}", operation, status);
            Ok(OperationResult::error(
                operation.clone(),
                error_text(&body, status.canonical_reason().unwrap_or("error")),
                Some(status.as_u16()),
            ))
        }
    }
}

#[async_trait]
impl EntityApi for ApiClient {
    async fn execute(&self, operation: &Operation) -> Result<OperationResult> {
        if let Operation::List { collection } = operation {
            if let Some(body) = self.cached(collection) {
                log::debug!("Serving {} from cache", collection);
                return Ok(OperationResult::success(operation.clone(), Some(body), None));
            }
        }

        let result = self.send(operation).await?;

        if let (Operation::List { collection }, true) = (operation, result.success) {
            if let Some(ref body) = result.data {
                self.store(collection, body);
            }
        }

        Ok(result)
    }

    fn invalidate(&self, collection: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            if cache.remove(collection).is_some() {
                log::info!("Invalidated cached {} list", collection);
            }
        }
    }
}

/// Best human-readable message from an error body
fn error_text(body: &Value, fallback: &str) -> String {
    match body {
        Value::Object(obj) => ["message", "error", "detail"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_text() {
        assert_eq!(error_text(&json!({"message": "SKU taken"}), "x"), "SKU taken");
        assert_eq!(error_text(&json!({"error": "bad"}), "x"), "bad");
        assert_eq!(error_text(&json!("  plain  "), "x"), "plain");
        assert_eq!(error_text(&Value::Null, "Conflict"), "Conflict");
        assert_eq!(error_text(&json!({"code": 7}), "x"), "{\"code\":7}");
    }

    #[tokio::test]
    async fn test_cached_list_served_without_network() {
        // Unroutable base URL: any real request would fail
        let config = ClientConfig::builder().base_url("http://127.0.0.1:9").build();
        let client = ApiClient::new(config).unwrap();
        client.store("brands", &json!([{"name": "Acme"}]));

        let records = client.list("brands").await.unwrap();
        assert_eq!(records, vec![json!({"name": "Acme"})]);

        client.invalidate("brands");
        assert!(client.cached("brands").is_none());
    }
}
