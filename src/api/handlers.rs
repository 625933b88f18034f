//! REST API request handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::agents::{AgentInfo, AgentRegistry, RegistryHealth, SampleResult};
use crate::metrics::{get_metrics, HealthState, MetricsSnapshot};
use crate::query::{Query, QueryResult};

/// Application state shared across handlers.
pub struct ApiState {
    /// Registry queries are routed through.
    pub registry: Arc<AgentRegistry>,
}

impl ApiState {
    /// Create new API state.
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Service metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthState,
    pub timestamp: DateTime<Utc>,
    pub details: RegistryHealth,
}

/// Agents list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsResponse {
    pub agents: Vec<String>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Query request.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Question text.
    pub query: String,
    /// Correlation token echoed in the response.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Query response: the routing result plus the caller's session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Self-test response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRunResponse {
    pub test_results: Vec<SampleResult>,
    pub timestamp: DateTime<Utc>,
}

/// Registry debug response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDebugResponse {
    pub registered_agents: Vec<String>,
    pub agent_details: BTreeMap<String, AgentInfo>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "ABS Agent API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: Utc::now(),
    })
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let details = state.registry.health_check().await;
    let status = details.overall();
    let code = StatusCode::from_u16(status.to_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now(),
            details,
        }),
    )
}

/// GET /agents
pub async fn list_agents_handler(State(state): State<Arc<ApiState>>) -> Json<AgentsResponse> {
    let agents = state.registry.list_agents();
    Json(AgentsResponse {
        count: agents.len(),
        agents,
        timestamp: Utc::now(),
    })
}

/// POST /query
pub async fn query_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let mut query = Query::new(request.query);
    if let Some(session_id) = request.session_id {
        query = query.with_session(session_id);
    }
    info!("Processing query: {}", query.preview());

    let result = state.registry.route(&query).await;
    info!(agent = %result.agent, success = result.success, "Query processed");

    Json(QueryResponse {
        result,
        session_id: query.session_id,
    })
}

/// GET /test/abs
pub async fn sample_queries_handler(State(state): State<Arc<ApiState>>) -> Json<SampleRunResponse> {
    Json(SampleRunResponse {
        test_results: state.registry.run_samples().await,
        timestamp: Utc::now(),
    })
}

/// GET /debug/registry
pub async fn debug_registry_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<RegistryDebugResponse> {
    Json(RegistryDebugResponse {
        registered_agents: state.registry.list_agents(),
        agent_details: state.registry.agent_details().await,
    })
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        get_metrics().export_prometheus(),
    )
}

/// GET /metrics/json
pub async fn metrics_json_handler() -> Json<MetricsSnapshot> {
    Json(get_metrics().export_json())
}
