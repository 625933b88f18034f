//! ABS HTTP client tests against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use abs_agent::config::SourceConfig;
use abs_agent::{
    AbsClient, AgentRegistry, DataSource, Dataset, FetchFilters, FetchOutcome, Intent, Query,
    Region, ResponseFormat, SourceError,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SDMX_JSON: &str = "application/vnd.sdmx.data+json";
const SDMX_CSV: &str = "application/vnd.sdmx.data+csv";

fn client_for(server: &MockServer, timeout_secs: u64, max_retries: usize) -> AbsClient {
    let config = SourceConfig {
        base_url: format!("{}/rest/data/ABS", server.uri()),
        timeout_secs,
        max_retries,
        backoff_base_ms: 10,
        ..Default::default()
    };
    AbsClient::from_config(&config).unwrap()
}

fn labour_force_message() -> String {
    json!({
        "data": {
            "dataSets": [{
                "series": {
                    "0:0": { "observations": { "0": [3.6], "1": [3.7] } }
                }
            }],
            "structure": {
                "dimensions": {
                    "series": [
                        { "id": "MEASURE", "values": [{ "id": "UR" }] },
                        { "id": "REGION", "values": [{ "id": "1" }] }
                    ],
                    "observation": [
                        { "id": "TIME_PERIOD", "values": [{ "id": "2024-05" }, { "id": "2024-06" }] }
                    ]
                }
            }
        }
    })
    .to_string()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_sdmx_json_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/data/ABS,LF"))
        .and(query_param("lastNObservations", "8"))
        .and(query_param("c[REGION]", "1"))
        .and(header("accept", SDMX_JSON))
        .respond_with(ResponseTemplate::new(200).set_body_raw(labour_force_message(), SDMX_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);
    let filters = FetchFilters::new().region(Some(Region::Nsw)).lookback(8);

    let rows = client.fetch_rows(Dataset::LabourForce, &filters).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.dimensions["REGION"] == "1"));
    assert!(rows
        .iter()
        .any(|r| r.period() == Some("2024-06") && r.value == Some(3.7)));
}

#[tokio::test]
async fn test_csv_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/data/ABS,BA"))
        .and(query_param("format", "csv"))
        .and(header("accept", SDMX_CSV))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "DATAFLOW,REGION,TIME_PERIOD,OBS_VALUE\nABS:BA,2,2024-06,15210\nABS:BA,2,2024-07,16004\n",
            SDMX_CSV,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);
    let filters = FetchFilters::new()
        .region(Some(Region::Vic))
        .format(ResponseFormat::Csv);

    let outcome = client.fetch(Dataset::BuildingApprovals, &filters).await;

    let rows = match outcome {
        FetchOutcome::Rows(rows) => rows,
        other => panic!("expected rows, got {}", other.kind()),
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].value, Some(16004.0));
    assert_eq!(rows[1].period(), Some("2024-07"));
}

#[tokio::test]
async fn test_not_found_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);

    let outcome = client.fetch(Dataset::Cpi, &FetchFilters::new()).await;

    assert!(matches!(outcome, FetchOutcome::Empty));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(labour_force_message(), SDMX_JSON))
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);

    let rows = client
        .fetch_rows(Dataset::LabourForce, &FetchFilters::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);

    let err = client
        .fetch_rows(Dataset::Cpi, &FetchFilters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::RateLimited(3)));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_server_error_fails_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let client = client_for(&server, 5, 3);

    let outcome = client.fetch(Dataset::Population, &FetchFilters::new()).await;

    let (status, body) = match outcome {
        FetchOutcome::Failed(SourceError::Http { status, body }) => (status, body),
        other => panic!("expected HTTP failure, got {}", other.kind()),
    };
    assert_eq!(status, 500);
    assert_eq!(body, "internal");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = client_for(&server, 1, 2);

    let err = client
        .fetch_rows(Dataset::Cpi, &FetchFilters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Timeout(2)));
}

#[tokio::test]
async fn test_probe_reports_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/data/ABS,CPI"))
        .and(query_param("lastNObservations", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", SDMX_JSON))
        .mount(&server)
        .await;

    let report = client_for(&server, 5, 3).probe().await;

    assert!(report.connection);
    assert_eq!(report.status_code, Some(200));
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_probe_reports_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = client_for(&server, 5, 3).probe().await;

    assert!(!report.connection);
    assert_eq!(report.status_code, Some(503));
}

#[tokio::test]
async fn test_route_with_live_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/data/ABS,LF"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(labour_force_message(), SDMX_JSON))
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server, 5, 3));
    let registry = AgentRegistry::with_default_agents(client).unwrap();

    let result = registry
        .route(&Query::new("Unemployment in New South Wales"))
        .await;

    assert_eq!(result.intent, Intent::Employment);
    assert!(result.success);
    assert!(result.response.contains("Data points available: 2"));
    assert!(result.response.contains("2024-06"));
}
