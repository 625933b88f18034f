//! Local execution against an in-process registry.

use std::sync::Arc;

use abs_agent::{
    api::{AgentsResponse, HealthResponse, QueryResponse},
    AbsClient, AgentRegistry, Config, DataSource, OfflineSource, Query,
};
use anyhow::Result;
use chrono::Utc;

use super::types::{classification_table, DiagnosticReport};

/// Build the registry the server and local commands use.
pub fn build_registry(config: &Config, offline: bool) -> Result<AgentRegistry> {
    let source: Arc<dyn DataSource> = if offline {
        Arc::new(OfflineSource)
    } else {
        Arc::new(AbsClient::from_config(&config.source)?)
    };
    Ok(AgentRegistry::with_default_agents(source)?)
}

/// Route one query.
pub async fn query(
    config: &Config,
    text: String,
    session_id: Option<String>,
) -> Result<QueryResponse> {
    let registry = build_registry(config, false)?;

    let mut query = Query::new(text);
    if let Some(session_id) = session_id {
        query = query.with_session(session_id);
    }
    let result = registry.route(&query).await;

    Ok(QueryResponse {
        result,
        session_id: query.session_id,
    })
}

/// List registered agents.
pub fn agents(config: &Config) -> Result<AgentsResponse> {
    let registry = build_registry(config, false)?;
    let agents = registry.list_agents();
    Ok(AgentsResponse {
        count: agents.len(),
        agents,
        timestamp: Utc::now(),
    })
}

/// Check registry and data source health.
pub async fn health(config: &Config) -> Result<HealthResponse> {
    let registry = build_registry(config, false)?;
    let details = registry.health_check().await;
    Ok(HealthResponse {
        status: details.overall(),
        timestamp: Utc::now(),
        details,
    })
}

/// Registration, classification, connectivity and end-to-end samples.
pub async fn diagnose(config: &Config) -> Result<DiagnosticReport> {
    let source = Arc::new(AbsClient::from_config(&config.source)?);
    let registry = AgentRegistry::with_default_agents(source.clone())?;

    let connection = source.probe().await;

    Ok(DiagnosticReport {
        registered_agents: registry.list_agents(),
        agent_details: registry.agent_details().await,
        classifications: classification_table(),
        connection: Some(connection),
        samples: registry.run_samples().await,
    })
}
