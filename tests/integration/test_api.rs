//! REST API tests driven through the router without a network listener.

use std::sync::Arc;

use abs_agent::{
    create_rest_router, Agent, AgentError, AgentRegistry, KeywordMatcher, RestApiConfig,
    DATA_AGENT_NAME,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::support::{population_rows, registry_with, Script};

fn router(script: Script) -> Router {
    let (registry, _source) = registry_with(script);
    create_rest_router(Arc::new(registry), &RestApiConfig::default())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_query(router: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_reports_running() {
    let (status, body) = get_json(router(Script::Outage), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "ABS Agent API");
    assert_eq!(body["status"], "running");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_agents_lists_data_agent() {
    let (status, body) = get_json(router(Script::Outage), "/agents").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["agents"], json!([DATA_AGENT_NAME]));
}

#[tokio::test]
async fn test_query_echoes_session() {
    let (status, body) = post_query(
        router(Script::Rows(population_rows())),
        json!({ "query": "What is the current population of New South Wales?", "session_id": "abc-123" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"], DATA_AGENT_NAME);
    assert_eq!(body["intent"], "population_query");
    assert_eq!(body["success"], true);
    assert_eq!(body["session_id"], "abc-123");
    assert!(body.get("error").is_none());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_query_without_session() {
    let (status, body) = post_query(
        router(Script::Outage),
        json!({ "query": "What's the weather like today?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"], "unknown");
    assert_eq!(body["intent"], "unknown");
    assert_eq!(body["success"], false);
    assert!(body.get("session_id").is_none());
}

#[tokio::test]
async fn test_economic_failure_is_still_ok_status() {
    let (status, body) = post_query(
        router(Script::Outage),
        json!({ "query": "Latest CPI inflation figures" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], body["error"]);
}

#[tokio::test]
async fn test_malformed_query_body_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\": 1"))
        .unwrap();
    let (status, _) = send(router(Script::Outage), request).await;
    assert!(status.is_client_error());

    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"session_id\": \"s\"}"))
        .unwrap();
    let (status, _) = send(router(Script::Outage), request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_health_degraded_when_source_down() {
    let (status, body) = get_json(router(Script::Outage), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    let agent = &body["details"]["agents"][DATA_AGENT_NAME];
    assert_eq!(agent["instance_created"], true);
    assert_eq!(agent["data_source"]["connection"], false);
}

#[tokio::test]
async fn test_health_healthy_when_source_up() {
    let (status, body) = get_json(router(Script::Rows(population_rows())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["total_agents"], 1);
}

#[tokio::test]
async fn test_health_unavailable_when_agent_cannot_start() {
    let mut registry = AgentRegistry::new();
    registry
        .register(
            "BrokenAgent",
            Arc::new(KeywordMatcher::new(["anything"])),
            Arc::new(|| -> abs_agent::Result<Arc<dyn Agent>> {
                Err(AgentError::Handler("missing credentials".to_string()))
            }),
        )
        .unwrap();
    let router = create_rest_router(Arc::new(registry), &RestApiConfig::default());

    let (status, body) = get_json(router, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    let agent = &body["details"]["agents"]["BrokenAgent"];
    assert_eq!(agent["instance_created"], false);
    assert!(agent["error"].as_str().unwrap().contains("missing credentials"));
}

#[tokio::test]
async fn test_sample_queries_endpoint() {
    let (status, body) = get_json(router(Script::Outage), "/test/abs").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["test_results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for result in results {
        assert_eq!(result["agent"], DATA_AGENT_NAME);
        assert_eq!(result["success"], true);
        assert!(result["response_length"].as_u64().unwrap() > 0);
    }
}

#[tokio::test]
async fn test_debug_registry_endpoint() {
    let (status, body) = get_json(router(Script::Outage), "/debug/registry").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registered_agents"], json!([DATA_AGENT_NAME]));
    let details = &body["agent_details"][DATA_AGENT_NAME];
    assert_eq!(details["status"], "active");
    assert_eq!(details["kind"], "data_analysis");
    assert_eq!(details["instantiated"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(router(Script::Outage), request).await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("abs_agent_queries_total"));
}

#[tokio::test]
async fn test_metrics_json_endpoint() {
    let (status, body) = get_json(router(Script::Outage), "/metrics/json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["counters"]["queries_total"].is_u64());
    assert!(body["gauges"]["uptime_seconds"].is_i64());
    assert!(body["histograms"]["query_duration_seconds"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, _) = send(router(Script::Outage), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
