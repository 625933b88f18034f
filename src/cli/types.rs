//! CLI response types for the diagnose command.

use std::collections::BTreeMap;

use abs_agent::{
    extract_region, AgentInfo, CapabilityMatcher, ConnectionReport, Intent, IntentClassifier,
    KeywordMatcher, Region, SampleResult, SAMPLE_QUERIES,
};
use serde::{Deserialize, Serialize};

/// Queries shown in the classification table besides the samples.
const EXTRA_CLASSIFICATION_QUERIES: [&str; 4] = [
    "What's the weather like today?",
    "Canberra population",
    "Latest CPI inflation figures",
    "Australia wide data",
];

/// How one query is matched, classified and localised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub query: String,
    pub can_handle: bool,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Everything the diagnose command reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub registered_agents: Vec<String>,
    pub agent_details: BTreeMap<String, AgentInfo>,
    pub classifications: Vec<ClassificationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionReport>,
    pub samples: Vec<SampleResult>,
}

/// Classification table for the sample and extra queries.
pub fn classification_table() -> Vec<ClassificationRow> {
    let matcher = KeywordMatcher::statistics_domain();
    let classifier = IntentClassifier::new();

    SAMPLE_QUERIES
        .iter()
        .chain(EXTRA_CLASSIFICATION_QUERIES.iter())
        .map(|query| {
            let can_handle = matcher.can_handle(query);
            ClassificationRow {
                query: query.to_string(),
                can_handle,
                intent: if can_handle {
                    classifier.classify(query)
                } else {
                    Intent::Unknown
                },
                region: extract_region(query),
            }
        })
        .collect()
}
