//! HTTP engine client for Elasticsearch-compatible REST APIs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::client::{BulkItem, BulkOperation, BulkResponse, EngineClient, Migrator};
use crate::error::EngineError;

/// Configuration for [`HttpEngineClient`].
#[derive(Debug, Clone)]
pub struct EngineClientConfig {
    /// Engine base URL (e.g., "http://localhost:9200")
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,
}

impl EngineClientConfig {
    /// Create config with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Engine client speaking the Elasticsearch REST API.
pub struct HttpEngineClient {
    client: Client,
    base_url: String,
}

impl HttpEngineClient {
    /// Create a new client.
    pub fn new(config: EngineClientConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turn a non-success response into an error.
async fn check_status(response: Response) -> Result<Response, EngineError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(EngineError::Status { status, body })
}

/// NDJSON body for a bulk request.
fn bulk_body(operations: &[BulkOperation]) -> Result<String, EngineError> {
    let mut body = String::new();
    for op in operations {
        let mut meta = Map::new();
        meta.insert("_index".to_string(), Value::String(op.doc.index.clone()));
        if let Some(id) = &op.doc.id {
            meta.insert("_id".to_string(), Value::String(id.clone()));
        }
        if let Some(routing) = &op.doc.routing {
            meta.insert("routing".to_string(), Value::String(routing.clone()));
        }

        let action = json!({ op.action.as_str(): meta });
        body.push_str(&serde_json::to_string(&action).map_err(|e| EngineError::Parse(e.to_string()))?);
        body.push('\n');
        body.push_str(
            &serde_json::to_string(&op.doc.source).map_err(|e| EngineError::Parse(e.to_string()))?,
        );
        body.push('\n');
    }
    Ok(body)
}

#[derive(Deserialize)]
struct RawBulkResponse {
    #[serde(default)]
    items: Vec<HashMap<String, RawBulkItem>>,
}

#[derive(Deserialize)]
struct RawBulkItem {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

/// Human-readable reason from a bulk item error object.
fn error_reason(error: &Value) -> String {
    match (error.get("type"), error.get("reason")) {
        (Some(Value::String(kind)), Some(Value::String(reason))) => format!("{kind}: {reason}"),
        (_, Some(Value::String(reason))) => reason.clone(),
        _ => error.to_string(),
    }
}

fn parse_bulk_response(raw: RawBulkResponse) -> Result<BulkResponse, EngineError> {
    let items = raw
        .items
        .into_iter()
        .map(|entry| {
            entry
                .into_values()
                .next()
                .map(|item| BulkItem {
                    index: item.index,
                    id: item.id,
                    status: item.status,
                    error: item.error.as_ref().map(error_reason),
                })
                .ok_or_else(|| EngineError::Parse("Empty bulk response item".to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BulkResponse { items })
}

#[async_trait]
impl EngineClient for HttpEngineClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        let response = self.client.head(self.url(index)).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(EngineError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), EngineError> {
        debug!(index = %index, "Creating index");
        let response = self.client.put(self.url(index)).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<Vec<String>, EngineError> {
        // Resolve aliases to the concrete indices behind them
        let response = self
            .client
            .get(self.url(&format!("{index}/_alias")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(index = %index, "Nothing to delete");
            return Ok(Vec::new());
        }
        let aliases: HashMap<String, Value> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let mut concrete: Vec<String> = aliases.into_keys().collect();
        concrete.sort();
        if concrete.is_empty() {
            return Ok(concrete);
        }

        info!(index = %index, concrete = ?concrete, "Deleting index");
        let response = self
            .client
            .delete(self.url(&concrete.join(",")))
            .send()
            .await?;
        check_status(response).await?;
        Ok(concrete)
    }

    async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse, EngineError> {
        if operations.is_empty() {
            return Ok(BulkResponse::default());
        }

        let response = self
            .client
            .post(self.url("_bulk"))
            .header("Content-Type", "application/x-ndjson")
            .body(bulk_body(operations)?)
            .send()
            .await?;

        let raw: RawBulkResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let parsed = parse_bulk_response(raw)?;
        if parsed.items.len() != operations.len() {
            return Err(EngineError::Parse(format!(
                "Bulk response has {} items for {} operations",
                parsed.items.len(),
                operations.len()
            )));
        }
        Ok(parsed)
    }

    async fn refresh(&self, indices: &[String]) -> Result<(), EngineError> {
        if indices.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.url(&format!("{}/_refresh", indices.join(","))))
            .query(&[("allow_no_indices", "true")])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Configuration for [`HttpMigrator`].
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Application base URL (e.g., "http://localhost:5601")
    pub base_url: String,

    /// Path of the migration endpoint
    pub path: String,

    /// Request timeout
    pub timeout: Duration,
}

impl MigratorConfig {
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Triggers a migration by POSTing to the application.
pub struct HttpMigrator {
    client: Client,
    url: String,
}

impl HttpMigrator {
    /// Create a new migrator.
    pub fn new(config: MigratorConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.path.trim_start_matches('/')
        );
        Ok(Self { client, url })
    }

    /// Full URL that [`Migrator::migrate`] posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Migrator for HttpMigrator {
    async fn migrate(&self) -> Result<(), EngineError> {
        info!(url = %self.url, "Triggering internal index migration");
        let response = self.client.post(&self.url).json(&json!({})).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
