//! Agent answering national statistics questions.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::policy::{policy_for, FailurePolicy};
use super::responses::{capabilities, fallback_response, live_response, ECONOMIC_UNAVAILABLE};
use super::traits::{Agent, AgentHealthReport, HealthReporter};
use crate::error::Result;
use crate::metrics::{get_metrics, HealthCheck};
use crate::query::{extract_region, Intent, IntentClassifier, KeywordMatcher, Query, QueryResult};
use crate::sources::{DataSource, FetchFilters, FetchOutcome};

/// Registered name of the data agent.
pub const DATA_AGENT_NAME: &str = "DataAnalysisAgent";

/// Classifies a query, fetches the matching dataset and formats an answer,
/// falling back to static text when the source is unavailable.
pub struct DataAnalysisAgent {
    source: Arc<dyn DataSource>,
    classifier: IntentClassifier,
}

impl DataAnalysisAgent {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            classifier: IntentClassifier::new(),
        }
    }

    /// Matcher deciding which queries this agent is offered.
    pub fn capability() -> KeywordMatcher {
        KeywordMatcher::statistics_domain()
    }

    async fn answer(&self, intent: Intent, query: &Query) -> QueryResult {
        let region = extract_region(&query.text);

        let Some(policy) = policy_for(intent) else {
            return QueryResult::answered(DATA_AGENT_NAME, intent, capabilities());
        };
        let Some(dataset) = policy.dataset else {
            return QueryResult::answered(DATA_AGENT_NAME, intent, capabilities());
        };

        let fetch_region = if policy.regional { region } else { None };
        let filters = FetchFilters::new()
            .region(fetch_region)
            .lookback(policy.lookback);

        debug!(
            agent = DATA_AGENT_NAME,
            intent = %intent,
            dataset = %dataset,
            region = ?fetch_region,
            "Fetching live data"
        );

        let outcome = self.source.fetch(dataset, &filters).await;
        match (outcome, policy.on_unavailable) {
            (FetchOutcome::Rows(rows), _) => QueryResult::answered(
                DATA_AGENT_NAME,
                intent,
                live_response(intent, fetch_region, &rows),
            ),
            (FetchOutcome::Failed(e), FailurePolicy::Propagate) => {
                warn!(agent = DATA_AGENT_NAME, intent = %intent, "Live data unavailable: {}", e);
                let message = e.to_string();
                QueryResult::failed(DATA_AGENT_NAME, intent, message.clone(), message)
            }
            (FetchOutcome::Empty, FailurePolicy::Propagate) => {
                get_metrics().fallback_responses_total.inc();
                QueryResult::answered(DATA_AGENT_NAME, intent, ECONOMIC_UNAVAILABLE)
            }
            (outcome, FailurePolicy::Fallback) => {
                if let FetchOutcome::Failed(e) = &outcome {
                    warn!(agent = DATA_AGENT_NAME, intent = %intent, "Using fallback response: {}", e);
                } else {
                    debug!(agent = DATA_AGENT_NAME, intent = %intent, "No rows, using fallback response");
                }
                get_metrics().fallback_responses_total.inc();
                QueryResult::answered(DATA_AGENT_NAME, intent, fallback_response(intent, region))
            }
        }
    }
}

#[async_trait]
impl Agent for DataAnalysisAgent {
    fn name(&self) -> &str {
        DATA_AGENT_NAME
    }

    fn kind(&self) -> &'static str {
        "data_analysis"
    }

    fn supported_intents(&self) -> &[Intent] {
        &Intent::HANDLED
    }

    async fn process(&self, query: &Query) -> Result<QueryResult> {
        let intent = self.classifier.classify(&query.text);
        info!(
            agent = DATA_AGENT_NAME,
            intent = %intent,
            session_id = query.session_id.as_deref().unwrap_or(""),
            "Processing query: {}",
            query.preview()
        );
        Ok(self.answer(intent, query).await)
    }

    fn health_reporter(&self) -> Option<&dyn HealthReporter> {
        Some(self)
    }
}

#[async_trait]
impl HealthReporter for DataAnalysisAgent {
    async fn health_check(&self) -> AgentHealthReport {
        let start = Instant::now();
        let report = self.source.probe().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        // Fallback text keeps answers flowing, so an unreachable source only degrades.
        let check = if report.connection {
            HealthCheck::healthy_with_duration(self.source.name(), elapsed_ms)
        } else {
            let reason = report
                .error
                .clone()
                .or_else(|| report.status_code.map(|c| format!("HTTP {}", c)))
                .unwrap_or_else(|| "unreachable".to_string());
            HealthCheck::degraded(self.source.name(), reason)
        };

        AgentHealthReport {
            status: check.status,
            checks: vec![check],
            data_source: Some(report),
        }
    }
}
