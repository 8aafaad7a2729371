use crate::circuit_breaker::{create_source_circuit_breaker, SourceCircuitBreaker};
use crate::errors::{AppError, ResultExt};
use crate::models::{EntityType, Record};
use crate::services::RecordSource;
use failsafe::futures::CircuitBreaker;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Records requested per `get_contacts`/`get_companies` call.
pub const PAGE_SIZE: usize = 100;

/// JSON-RPC client for the HubSpot MCP server.
#[derive(Clone)]
pub struct McpClient {
    client: reqwest::Client,
    url: String,
}

impl McpClient {
    /// Creates a new `McpClient` posting to `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create MCP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Calls an MCP tool and returns its decoded result.
    ///
    /// The server wraps tool output as JSON text in `result.content[0].text`.
    /// A JSON-RPC `error` member, or an `error` key in the decoded payload, is
    /// reported as [`AppError::ExternalApiError`].
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, AppError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "call_tool",
            "params": {
                "name": name,
                "arguments": arguments
            },
            "id": 1
        });
        tracing::debug!("Calling MCP tool {} at {}", name, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("MCP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "MCP server returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse MCP response: {}", e))
        })?;

        if let Some(error) = body.get("error") {
            return Err(AppError::ExternalApiError(format!(
                "MCP tool {} failed: {}",
                name, error
            )));
        }

        let text = body
            .pointer("/result/content/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::ExternalApiError(format!("MCP tool {} returned no text content", name))
            })?;

        let data: Value = serde_json::from_str(text)
            .map_err(AppError::from)
            .with_context(|| format!("Decoding {} tool output", name))?;

        if let Some(error) = data.get("error") {
            return Err(AppError::ExternalApiError(format!(
                "MCP tool {} reported: {}",
                name, error
            )));
        }

        Ok(data)
    }
}

/// One page of a HubSpot list call.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Record>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    after: Option<String>,
}

impl Page {
    fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .and_then(|n| n.after.as_deref())
    }
}

fn list_tool(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Contact => "get_contacts",
        EntityType::Company => "get_companies",
    }
}

/// [`RecordSource`] backed by the MCP server, guarded by a circuit breaker.
#[derive(Clone)]
pub struct McpRecordSource {
    client: McpClient,
    breaker: SourceCircuitBreaker,
}

impl McpRecordSource {
    pub fn new(client: McpClient) -> Self {
        Self {
            client,
            breaker: create_source_circuit_breaker(),
        }
    }

    async fn fetch_page(
        &self,
        tool: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Page, AppError> {
        let mut arguments = json!({ "limit": limit });
        if let Some(cursor) = after {
            arguments["after"] = json!(cursor);
        }

        let data = self
            .breaker
            .call(self.client.call_tool(tool, arguments))
            .await
            .map_err(|e| match e {
                failsafe::Error::Inner(e) => e,
                failsafe::Error::Rejected => AppError::ExternalApiError(
                    "MCP circuit breaker is open, skipping request".to_string(),
                ),
            })?;

        Ok(serde_json::from_value(data)?)
    }

    /// Pages through a list tool until `limit` records, a short page, a page
    /// without a cursor, or an error. Errors keep what was collected so far.
    pub async fn fetch_all(&self, entity: EntityType, limit: usize) -> Vec<Record> {
        let tool = list_tool(entity);
        let mut records: Vec<Record> = Vec::new();
        let mut after: Option<String> = None;

        while records.len() < limit {
            let batch = PAGE_SIZE.min(limit - records.len());
            let page = match self.fetch_page(tool, batch, after.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Error fetching {}s: {}", entity, e);
                    break;
                }
            };

            let received = page.results.len();
            let next = page.next_cursor().map(str::to_string);
            records.extend(page.results);
            tracing::debug!(
                "Fetched page of {} {}s ({} so far)",
                received,
                entity,
                records.len()
            );

            if received < batch {
                break;
            }
            match next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        records.truncate(limit);
        tracing::info!("Retrieved {} {}s", records.len(), entity);
        records
    }
}

#[async_trait::async_trait]
impl RecordSource for McpRecordSource {
    async fn fetch_contacts(&self, limit: usize) -> Vec<Record> {
        self.fetch_all(EntityType::Contact, limit).await
    }

    async fn fetch_companies(&self, limit: usize) -> Vec<Record> {
        self.fetch_all(EntityType::Company, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cursor() {
        let page: Page = serde_json::from_value(json!({
            "results": [{"id": "1", "properties": {}}],
            "paging": {"next": {"after": "abc"}}
        }))
        .unwrap();
        assert_eq!(page.next_cursor(), Some("abc"));

        let page: Page = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_list_tool_names() {
        assert_eq!(list_tool(EntityType::Contact), "get_contacts");
        assert_eq!(list_tool(EntityType::Company), "get_companies");
    }
}
