//! Agent trait definitions and common types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::{HealthCheck, HealthState};
use crate::query::{Intent, Query, QueryResult};
use crate::sources::ConnectionReport;

/// A unit that answers the queries its registration's matcher accepts.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name reported in every result this agent produces.
    fn name(&self) -> &str;

    /// Implementation kind, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Intents this agent may assign.
    fn supported_intents(&self) -> &[Intent];

    /// Answer a query. Recoverable data problems are folded into the result;
    /// an `Err` is reported by the registry as a dispatch fault.
    async fn process(&self, query: &Query) -> Result<QueryResult>;

    /// Extended health capability, if the agent has one.
    fn health_reporter(&self) -> Option<&dyn HealthReporter> {
        None
    }
}

/// Optional capability for agents that can check their own dependencies.
#[async_trait]
pub trait HealthReporter: Send + Sync {
    async fn health_check(&self) -> AgentHealthReport;
}

/// Extra health details contributed by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealthReport {
    pub status: HealthState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<ConnectionReport>,
}

/// Whether an agent can currently be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Error,
}

/// Descriptive information about a registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub status: AgentStatus,
    #[serde(default)]
    pub supported_intents: Vec<Intent>,
    pub instantiated: bool,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentInfo {
    /// Info entry for a name the registry does not know.
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            error: Some(format!("Agent {} not found", name)),
            name,
            kind: None,
            status: AgentStatus::Error,
            supported_intents: Vec::new(),
            instantiated: false,
            priority: 0,
        }
    }
}

/// Outcome of one canned self-test query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    pub query: String,
    pub agent: String,
    pub intent: Intent,
    pub success: bool,
    pub response_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SampleResult {
    pub fn new(query: impl Into<String>, result: &QueryResult) -> Self {
        Self {
            query: query.into(),
            agent: result.agent.clone(),
            intent: result.intent,
            success: result.success,
            response_length: result.response.chars().count(),
            error: result.error.clone(),
        }
    }
}

/// Health of one registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealth {
    pub status: HealthState,
    pub instance_created: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<ConnectionReport>,
}

impl AgentHealth {
    pub fn healthy(instance_created: bool) -> Self {
        Self {
            status: HealthState::Healthy,
            instance_created,
            error: None,
            checks: Vec::new(),
            data_source: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            instance_created: false,
            error: Some(error.into()),
            checks: Vec::new(),
            data_source: None,
        }
    }

    /// Fold in an agent's own report; the worse status wins.
    pub fn merge(mut self, report: AgentHealthReport) -> Self {
        self.status = self.status.combine(report.status);
        self.checks.extend(report.checks);
        if report.data_source.is_some() {
            self.data_source = report.data_source;
        }
        self
    }
}

/// Health of the whole registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryHealth {
    pub timestamp: DateTime<Utc>,
    pub total_agents: usize,
    pub agents: std::collections::BTreeMap<String, AgentHealth>,
}

impl RegistryHealth {
    /// Worst status across agents; healthy when nothing is registered.
    pub fn overall(&self) -> HealthState {
        self.agents
            .values()
            .fold(HealthState::Healthy, |acc, a| acc.combine(a.status))
    }
}
