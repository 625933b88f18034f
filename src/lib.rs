//! abs-agent: query routing for Australian Bureau of Statistics questions
//!
//! Classifies free-text questions by keyword, routes them to a registered
//! agent and answers from live ABS data, falling back to pre-written text
//! when the data API is unavailable.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod sources;

pub use agents::{
    Agent, AgentFactory, AgentHealth, AgentHealthReport, AgentInfo, AgentRegistry, AgentStatus,
    DataAnalysisAgent, FailurePolicy, HealthReporter, IntentPolicy, RegistryHealth, SampleResult,
    DATA_AGENT_NAME, INTENT_POLICIES, SAMPLE_QUERIES,
};
pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use config::Config;
pub use error::{AgentError, ConfigError, RegistryError, Result, SourceError};
pub use metrics::{get_metrics, HealthCheck, HealthState, Metrics, MetricsSnapshot};
pub use query::{
    extract_region, CapabilityMatcher, Intent, IntentClassifier, KeywordMatcher, Query,
    QueryResult, Region,
};
pub use sources::{
    AbsClient, ConnectionReport, DataSource, Dataset, FetchFilters, FetchOutcome, Observation,
    OfflineSource, ResponseFormat,
};
