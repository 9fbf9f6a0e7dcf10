use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::backend::{
    AssessmentBackend, LoadDefinitionError, SubmitExecutionError, SubmitExecutionRequest,
};
use crate::core::config::Settings;
use crate::domain::models::{AssessmentDefinition, ExecutionResult};

/// REST client for the platform assessment API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.backend().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build assessment API HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.backend().base_url.trim_end_matches('/').to_string(),
            api_key: settings.backend().api_key.clone(),
        })
    }
}

#[async_trait]
impl AssessmentBackend for HttpBackend {
    async fn load_definition(
        &self,
        session_id: &str,
    ) -> Result<AssessmentDefinition, LoadDefinitionError> {
        let endpoint = format!("{}/sessions/{}/definition", self.base_url, session_id);

        let response = self
            .client
            .get(&endpoint)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|err| {
                LoadDefinitionError::Transient(
                    anyhow!(err).context("Failed to call definition endpoint"),
                )
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadDefinitionError::NotFound(session_id.to_string()));
        }

        let raw_body = response.text().await.map_err(|err| {
            LoadDefinitionError::Transient(anyhow!(err).context("Failed to read definition body"))
        })?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&raw_body).unwrap_or(Value::Null);
            return Err(LoadDefinitionError::Transient(anyhow!(
                "definition fetch failed (status {}): {}",
                status,
                extract_error_message(&parsed)
            )));
        }

        serde_json::from_str::<AssessmentDefinition>(&raw_body).map_err(|err| {
            LoadDefinitionError::Transient(anyhow!(
                "definition endpoint returned unreadable body: {err}: {raw_body}"
            ))
        })
    }

    async fn submit_execution(
        &self,
        session_id: &str,
        request: SubmitExecutionRequest,
    ) -> Result<ExecutionResult, SubmitExecutionError> {
        let endpoint = format!("{}/sessions/{}/execution", self.base_url, session_id);

        let response = self
            .client
            .post(&endpoint)
            .header("X-Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                SubmitExecutionError::Transient(
                    anyhow!(err).context("Failed to call execution endpoint"),
                )
            })?;

        let status = response.status();
        let raw_body = response.text().await.map_err(|err| {
            SubmitExecutionError::Transient(anyhow!(err).context("Failed to read execution body"))
        })?;

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let parsed = serde_json::from_str::<Value>(&raw_body).unwrap_or(Value::Null);
            return Err(SubmitExecutionError::Validation(extract_error_message(&parsed)));
        }

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&raw_body).unwrap_or(Value::Null);
            return Err(SubmitExecutionError::Transient(anyhow!(
                "execution submit failed (status {}): {}",
                status,
                extract_error_message(&parsed)
            )));
        }

        serde_json::from_str::<ExecutionResult>(&raw_body).map_err(|err| {
            SubmitExecutionError::Transient(anyhow!(
                "execution endpoint returned unreadable body: {err}: {raw_body}"
            ))
        })
    }
}

fn extract_error_message(payload: &Value) -> String {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}
