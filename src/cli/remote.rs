//! Remote execution against a running abs-agent server.

use std::time::Duration;

use abs_agent::api::{
    AgentsResponse, HealthResponse, QueryResponse, RegistryDebugResponse, SampleRunResponse,
};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{classification_table, DiagnosticReport};

/// HTTP client for the REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a JSON body. Non-2xx bodies are accepted when they still
    /// decode, which is how `/health` reports an unhealthy service.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(anyhow!("Server returned {}: {}", status, body)),
            Err(e) => Err(anyhow!("Invalid response from server: {}", e)),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", self.base_url))?;
        Self::decode(response).await
    }

    pub async fn query(&self, text: String, session_id: Option<String>) -> Result<QueryResponse> {
        let mut body = json!({ "query": text });
        if let Some(session_id) = session_id {
            body["session_id"] = json!(session_id);
        }

        let response = self
            .client
            .post(self.url("/query"))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", self.base_url))?;
        Self::decode(response).await
    }

    pub async fn agents(&self) -> Result<AgentsResponse> {
        self.get("/agents").await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    /// Assemble a diagnostic report from the server's debug endpoints.
    pub async fn diagnose(&self) -> Result<DiagnosticReport> {
        let registry: RegistryDebugResponse = self.get("/debug/registry").await?;
        let health = self.health().await?;
        let samples: SampleRunResponse = self.get("/test/abs").await?;

        let connection = health
            .details
            .agents
            .values()
            .find_map(|agent| agent.data_source.clone());

        Ok(DiagnosticReport {
            registered_agents: registry.registered_agents,
            agent_details: registry.agent_details,
            classifications: classification_table(),
            connection,
            samples: samples.test_results,
        })
    }
}
