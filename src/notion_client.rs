use crate::config::CrmConfig;
use crate::errors::AppError;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Notion page-creation API used as the CRM backend.
#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    database_id: String,
    notion_version: String,
}

impl NotionClient {
    /// Creates a new `NotionClient` targeting the configured database.
    pub fn new(config: &CrmConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Notion client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.notion_base_url.clone(),
            token: config.notion_token.clone(),
            database_id: config.notion_database_id.clone(),
            notion_version: config.notion_version.clone(),
        })
    }

    /// Creates one page (database row) with the given property map.
    ///
    /// # Returns
    ///
    /// * `Result<String, AppError>` - The ID of the created page.
    pub async fn create_page(&self, properties: Value) -> Result<String, AppError> {
        let url = format!("{}/v1/pages", self.base_url);
        tracing::info!("Creating page in Notion database {}", self.database_id);

        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.notion_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Notion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(upstream_error_message(
                status,
                &error_text,
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Notion response: {}", e))
        })?;

        let page_id = data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        tracing::info!("✓ Notion page created: {}", page_id);
        Ok(page_id)
    }
}

/// Prefers the API's own `message` field over the raw body.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("{}: {}", status, body))
}
