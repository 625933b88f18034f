//! Scripted data sources shared by the integration tests.

use std::sync::Arc;

use abs_agent::{
    AgentRegistry, ConnectionReport, DataSource, Dataset, FetchFilters, FetchOutcome, Observation,
    SourceError,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// What a scripted source answers for every fetch.
#[derive(Clone)]
pub enum Script {
    Rows(Vec<Observation>),
    Empty,
    Outage,
}

/// Data source that replays a script and records each fetch.
pub struct ScriptedSource {
    script: Script,
    calls: Mutex<Vec<(Dataset, FetchFilters)>>,
}

impl ScriptedSource {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Dataset, FetchFilters)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, dataset: Dataset, filters: &FetchFilters) -> FetchOutcome {
        self.calls.lock().push((dataset, filters.clone()));
        match &self.script {
            Script::Rows(rows) => FetchOutcome::Rows(rows.clone()),
            Script::Empty => FetchOutcome::Empty,
            Script::Outage => {
                FetchOutcome::Failed(SourceError::Transport("connection refused".to_string()))
            }
        }
    }

    async fn probe(&self) -> ConnectionReport {
        match self.script {
            Script::Outage => ConnectionReport::unreachable("connection refused", 3),
            _ => ConnectionReport::reachable(200, 3),
        }
    }
}

/// Two quarterly population rows for NSW.
pub fn population_rows() -> Vec<Observation> {
    vec![
        Observation::new(Some(8_339_000.0))
            .with_dimension("REGION", "1")
            .with_dimension("TIME_PERIOD", "2024-Q1"),
        Observation::new(Some(8_342_000.0))
            .with_dimension("REGION", "1")
            .with_dimension("TIME_PERIOD", "2024-Q2"),
    ]
}

/// Default registry over a scripted source.
pub fn registry_with(script: Script) -> (AgentRegistry, Arc<ScriptedSource>) {
    let source = ScriptedSource::new(script);
    let registry = AgentRegistry::with_default_agents(source.clone()).unwrap();
    (registry, source)
}
