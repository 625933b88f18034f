//! End-to-end routing tests over scripted data sources.

use abs_agent::agents::responses::ECONOMIC_UNAVAILABLE;
use abs_agent::{Dataset, Intent, Query, Region, DATA_AGENT_NAME};

use super::support::{population_rows, registry_with, Script};

#[tokio::test]
async fn test_live_population_for_nsw() {
    let (registry, source) = registry_with(Script::Rows(population_rows()));

    let result = registry
        .route(&Query::new("What is the current population of New South Wales?"))
        .await;

    assert_eq!(result.agent, DATA_AGENT_NAME);
    assert_eq!(result.intent, Intent::Population);
    assert!(result.success);
    assert!(result.error.is_none());
    assert!(result.response.contains("New South Wales (NSW)"));
    assert!(result.response.contains("Data points available: 2"));
    assert!(result.response.contains("2024-Q2"));
    assert!(result.response.contains("abs.gov.au"));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    let (dataset, filters) = &calls[0];
    assert_eq!(*dataset, Dataset::Population);
    assert_eq!(filters.region, Some(Region::Nsw));
    assert_eq!(filters.lookback_periods, Some(4));
}

#[tokio::test]
async fn test_employment_outage_uses_fallback() {
    let (registry, source) = registry_with(Script::Outage);

    let result = registry
        .route(&Query::new("Show me employment statistics for Australia"))
        .await;

    assert_eq!(result.agent, DATA_AGENT_NAME);
    assert_eq!(result.intent, Intent::Employment);
    assert!(result.success);
    assert!(result.response.contains("3.7%"));
    assert!(result.response.ends_with("abs.gov.au/labour-force"));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Dataset::LabourForce);
    assert_eq!(calls[0].1.lookback_periods, Some(8));
}

#[tokio::test]
async fn test_live_employment_is_national() {
    let (registry, source) = registry_with(Script::Rows(population_rows()));

    let result = registry
        .route(&Query::new("Show me employment statistics for Australia"))
        .await;

    assert_eq!(result.intent, Intent::Employment);
    assert!(result.success);
    assert!(result
        .response
        .starts_with("Based on the latest ABS Labour Force data for Australia:"));
    assert!(!result.response.contains("Northern Territory"));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Dataset::LabourForce);
    assert_eq!(calls[0].1.region, None);
}

#[tokio::test]
async fn test_population_outage_uses_fallback() {
    let (registry, _source) = registry_with(Script::Outage);

    let result = registry
        .route(&Query::new("population of nsw"))
        .await;

    assert_eq!(result.intent, Intent::Population);
    assert!(result.success);
    assert!(result.response.contains("8.2 million"));
}

#[tokio::test]
async fn test_housing_outage_highlights_region() {
    let (registry, source) = registry_with(Script::Empty);

    let result = registry
        .route(&Query::new("Housing construction trends in Queensland"))
        .await;

    assert_eq!(result.intent, Intent::Housing);
    assert!(result.success);
    assert!(result.response.contains("Brisbane"));
    assert!(result.response.ends_with("abs.gov.au/building-approvals"));
    assert_eq!(source.calls()[0].1.region, None);
}

#[tokio::test]
async fn test_economic_outage_reports_failure() {
    let (registry, _source) = registry_with(Script::Outage);

    let result = registry.route(&Query::new("Latest CPI inflation figures")).await;

    assert_eq!(result.agent, DATA_AGENT_NAME);
    assert_eq!(result.intent, Intent::EconomicIndicator);
    assert!(!result.success);
    let error = result.error.clone().unwrap();
    assert!(error.contains("connection refused"));
    assert_eq!(result.response, error);
}

#[tokio::test]
async fn test_economic_empty_is_unavailable_text() {
    let (registry, source) = registry_with(Script::Empty);

    let result = registry.route(&Query::new("economic outlook")).await;

    assert_eq!(result.intent, Intent::EconomicIndicator);
    assert!(result.success);
    assert_eq!(result.response, ECONOMIC_UNAVAILABLE);
    assert_eq!(source.calls()[0].0, Dataset::Cpi);
}

#[tokio::test]
async fn test_generic_request_lists_capabilities() {
    let (registry, source) = registry_with(Script::Outage);

    let result = registry.route(&Query::new("Give me some ABS data")).await;

    assert_eq!(result.intent, Intent::GenericDataRequest);
    assert!(result.success);
    assert!(result.response.contains("Consumer Price Index"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_unrelated_query_is_unmatched() {
    let (registry, source) = registry_with(Script::Rows(population_rows()));

    let result = registry.route(&Query::new("What's the weather like today?")).await;

    assert!(result.is_no_match());
    assert_eq!(result.agent, "unknown");
    assert_eq!(result.intent, Intent::Unknown);
    assert!(!result.success);
    assert!(result.error.is_none());
    assert!(source.calls().is_empty());
    assert!(!registry.is_instantiated(DATA_AGENT_NAME));
}

#[tokio::test]
async fn test_empty_query_is_unmatched() {
    let (registry, _source) = registry_with(Script::Outage);

    let result = registry.route(&Query::new("")).await;

    assert!(result.is_no_match());
    assert!(!registry.is_instantiated(DATA_AGENT_NAME));
}

#[tokio::test]
async fn test_routing_is_repeatable() {
    let (registry, source) = registry_with(Script::Outage);
    let query = Query::new("Unemployment rate in Victoria");

    let first = registry.route(&query).await;
    let second = registry.route(&query).await;

    assert_eq!(first.agent, second.agent);
    assert_eq!(first.intent, second.intent);
    assert_eq!(first.success, second.success);
    assert_eq!(first.response, second.response);
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn test_samples_cover_each_live_topic() {
    let (registry, _source) = registry_with(Script::Outage);

    let samples = registry.run_samples().await;

    let intents: Vec<Intent> = samples.iter().map(|s| s.intent).collect();
    assert_eq!(
        intents,
        vec![Intent::Population, Intent::Employment, Intent::Housing]
    );
    assert!(samples.iter().all(|s| s.success && s.response_length > 0));
}
