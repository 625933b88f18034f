//! Agent registry: registration, lazy singleton instances and query routing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::data_agent::{DataAnalysisAgent, DATA_AGENT_NAME};
use super::traits::{Agent, AgentHealth, AgentInfo, AgentStatus, RegistryHealth, SampleResult};
use crate::error::{AgentError, RegistryError, Result};
use crate::metrics::{get_metrics, Metrics};
use crate::query::{CapabilityMatcher, Query, QueryResult};
use crate::sources::DataSource;

/// Canned queries used by self-tests, one per live topic.
pub const SAMPLE_QUERIES: [&str; 3] = [
    "What is the current population of New South Wales?",
    "Show me employment statistics for Australia",
    "Can you analyze housing price trends using ABS data?",
];

/// Builds an agent instance on first use.
pub type AgentFactory = Arc<dyn Fn() -> Result<Arc<dyn Agent>> + Send + Sync>;

struct Registration {
    name: String,
    priority: i32,
    matcher: Arc<dyn CapabilityMatcher>,
    factory: AgentFactory,
    instance: OnceCell<Arc<dyn Agent>>,
}

/// Registry of agents.
///
/// Candidates are tried in descending priority; equal priorities keep
/// registration order. Each registration creates at most one instance, on
/// first use, even when several callers race for it.
#[derive(Default)]
pub struct AgentRegistry {
    registrations: Vec<Registration>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the data agent reading from `source`.
    pub fn with_default_agents(source: Arc<dyn DataSource>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            DATA_AGENT_NAME,
            Arc::new(DataAnalysisAgent::capability()),
            Arc::new(move || -> Result<Arc<dyn Agent>> {
                Ok(Arc::new(DataAnalysisAgent::new(source.clone())))
            }),
        )?;
        Ok(registry)
    }

    /// Register an agent at priority 0.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        matcher: Arc<dyn CapabilityMatcher>,
        factory: AgentFactory,
    ) -> Result<()> {
        self.register_with_priority(name, 0, matcher, factory)
    }

    /// Register an agent. Higher priorities are offered queries first.
    pub fn register_with_priority(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        matcher: Arc<dyn CapabilityMatcher>,
        factory: AgentFactory,
    ) -> Result<()> {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(RegistryError::Duplicate(name).into());
        }

        let position = self
            .registrations
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(self.registrations.len());

        info!(agent = %name, priority, "Registered agent");
        self.registrations.insert(
            position,
            Registration {
                name,
                priority,
                matcher,
                factory,
                instance: OnceCell::new(),
            },
        );
        Ok(())
    }

    /// Registered names in routing order.
    pub fn list_agents(&self) -> Vec<String> {
        self.registrations.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Whether the named agent has been instantiated.
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.find(name)
            .map(|r| r.instance.initialized())
            .unwrap_or(false)
    }

    fn find(&self, name: &str) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.name == name)
    }

    /// Get the named agent, creating it on first use.
    pub async fn get_instance(&self, name: &str) -> Result<Arc<dyn Agent>> {
        let registration = self
            .find(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Self::instantiate(registration).await
    }

    async fn instantiate(registration: &Registration) -> Result<Arc<dyn Agent>> {
        registration
            .instance
            .get_or_try_init(|| async {
                let agent = (registration.factory)().map_err(|e| {
                    AgentError::from(RegistryError::Instantiation {
                        name: registration.name.clone(),
                        reason: e.to_string(),
                    })
                })?;
                get_metrics().agents_instantiated.inc();
                info!(agent = %registration.name, "Created agent instance");
                Ok::<_, AgentError>(agent)
            })
            .await
            .cloned()
    }

    /// Route a query to the first agent whose matcher accepts it.
    ///
    /// Never fails: no match, instantiation errors and agent errors are all
    /// reported in the returned result.
    pub async fn route(&self, query: &Query) -> QueryResult {
        let metrics = get_metrics();
        metrics.queries_total.inc();
        let _timer = Metrics::start_timer(&metrics.query_duration_seconds);

        let Some(registration) = self
            .registrations
            .iter()
            .find(|r| r.matcher.can_handle(&query.text))
        else {
            metrics.queries_unmatched_total.inc();
            info!("No agent matched query: {}", query.preview());
            return QueryResult::no_match();
        };

        debug!(agent = %registration.name, "Query matched");

        let outcome = match Self::instantiate(registration).await {
            Ok(agent) => agent.process(query).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                info!(
                    agent = %registration.name,
                    intent = %result.intent,
                    success = result.success,
                    "Query routed"
                );
                result
            }
            Err(e) => {
                metrics.query_faults_total.inc();
                error!(agent = %registration.name, "Error routing query: {}", e);
                QueryResult::fault(e)
            }
        }
    }

    /// Describe a registered agent, instantiating it if needed.
    pub async fn get_agent_info(&self, name: &str) -> AgentInfo {
        let Some(registration) = self.find(name) else {
            return AgentInfo::not_found(name);
        };

        match Self::instantiate(registration).await {
            Ok(agent) => AgentInfo {
                name: registration.name.clone(),
                kind: Some(agent.kind().to_string()),
                status: AgentStatus::Active,
                supported_intents: agent.supported_intents().to_vec(),
                instantiated: true,
                priority: registration.priority,
                error: None,
            },
            Err(e) => AgentInfo {
                name: registration.name.clone(),
                kind: None,
                status: AgentStatus::Error,
                supported_intents: Vec::new(),
                instantiated: false,
                priority: registration.priority,
                error: Some(e.to_string()),
            },
        }
    }

    /// Info for every registered agent, keyed by name.
    pub async fn agent_details(&self) -> BTreeMap<String, AgentInfo> {
        let mut details = BTreeMap::new();
        for name in self.list_agents() {
            let info = self.get_agent_info(&name).await;
            details.insert(name, info);
        }
        details
    }

    /// Route each of [`SAMPLE_QUERIES`] under a fresh test session.
    pub async fn run_samples(&self) -> Vec<SampleResult> {
        let mut results = Vec::with_capacity(SAMPLE_QUERIES.len());
        for text in SAMPLE_QUERIES {
            let query = Query::new(text).with_session(format!("test_{}", Uuid::new_v4()));
            let result = self.route(&query).await;
            results.push(SampleResult::new(text, &result));
        }
        results
    }

    /// Check every agent, including any extended health it reports.
    pub async fn health_check(&self) -> RegistryHealth {
        let mut agents = BTreeMap::new();

        for registration in &self.registrations {
            let health = match Self::instantiate(registration).await {
                Ok(agent) => {
                    let health = AgentHealth::healthy(registration.instance.initialized());
                    match agent.health_reporter() {
                        Some(reporter) => health.merge(reporter.health_check().await),
                        None => health,
                    }
                }
                Err(e) => AgentHealth::unhealthy(e.to_string()),
            };
            agents.insert(registration.name.clone(), health);
        }

        RegistryHealth {
            timestamp: Utc::now(),
            total_agents: self.registrations.len(),
            agents,
        }
    }
}
