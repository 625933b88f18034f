//! HTTP client for the ABS data API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, error, info, warn};

use super::parse::parse_body;
use super::{ConnectionReport, DataSource, Dataset, FetchFilters, FetchOutcome, Observation, ResponseFormat};
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::metrics::{get_metrics, Metrics};

const SDMX_JSON: &str = "application/vnd.sdmx.data+json";
const SDMX_CSV: &str = "application/vnd.sdmx.data+csv";

/// Client for `data.api.abs.gov.au`.
///
/// Each fetch makes up to `max_retries` attempts. Timeouts, transport errors
/// and HTTP 429 are retried with exponential backoff; 404 means the dataset
/// has nothing for the filters; any other error status fails immediately.
#[derive(Debug, Clone)]
pub struct AbsClient {
    client: Client,
    base_url: String,
    max_retries: usize,
    backoff_base: Duration,
}

impl AbsClient {
    /// Build a client from source configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        })
    }

    /// Endpoint for a dataflow.
    pub fn dataset_url(&self, dataset: Dataset) -> String {
        format!("{},{}", self.base_url, dataset.id())
    }

    /// Query parameters for a fetch.
    pub fn query_params(filters: &FetchFilters) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(periods) = filters.lookback_periods {
            params.push(("lastNObservations", periods.to_string()));
        }
        if let Some(region) = filters.region {
            params.push(("c[REGION]", region.abs_code().to_string()));
        }
        if let Some(updated_after) = &filters.updated_after {
            params.push(("updatedAfter", updated_after.clone()));
        }
        if filters.format == ResponseFormat::Csv {
            params.push(("format", "csv".to_string()));
        }
        params
    }

    fn backoff(&self, attempt: usize) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt as u32)
    }

    /// Fetch rows with retries. `Ok(vec![])` means the source had nothing.
    pub async fn fetch_rows(
        &self,
        dataset: Dataset,
        filters: &FetchFilters,
    ) -> std::result::Result<Vec<Observation>, SourceError> {
        let metrics = get_metrics();
        let _timer = Metrics::start_timer(&metrics.fetch_duration_seconds);

        let url = self.dataset_url(dataset);
        let params = Self::query_params(filters);
        let accept = match filters.format {
            ResponseFormat::Json => SDMX_JSON,
            ResponseFormat::Csv => SDMX_CSV,
        };

        let mut last_error = SourceError::Transport("no attempts made".to_string());

        for attempt in 0..self.max_retries {
            metrics.fetch_attempts_total.inc();
            debug!(dataset = %dataset, attempt = attempt + 1, "Fetching {}", url);

            let sent = self
                .client
                .get(&url)
                .query(&params)
                .header(header::ACCEPT, accept)
                .send()
                .await;

            match sent {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let content_type = response
                            .headers()
                            .get(header::CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();

                        match response.text().await {
                            Ok(body) => {
                                let rows = parse_body(&content_type, &body);
                                info!(dataset = %dataset, rows = rows.len(), "Fetched ABS data");
                                return Ok(rows);
                            }
                            Err(e) => {
                                last_error = SourceError::Transport(e.to_string());
                                warn!(
                                    dataset = %dataset,
                                    attempt = attempt + 1,
                                    "Failed to read response body: {}", e
                                );
                            }
                        }
                    } else if status == StatusCode::NOT_FOUND {
                        warn!(dataset = %dataset, "Dataset not found");
                        return Ok(Vec::new());
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = SourceError::RateLimited(attempt + 1);
                        warn!(dataset = %dataset, attempt = attempt + 1, "Rate limited by ABS API");
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        error!(dataset = %dataset, status = status.as_u16(), "ABS API error");
                        metrics.fetch_failures_total.inc();
                        return Err(SourceError::Http {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
                Err(e) if e.is_timeout() => {
                    last_error = SourceError::Timeout(attempt + 1);
                    warn!(dataset = %dataset, attempt = attempt + 1, "Request timeout");
                }
                Err(e) => {
                    last_error = SourceError::Transport(e.to_string());
                    warn!(dataset = %dataset, attempt = attempt + 1, "Request failed: {}", e);
                }
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        error!(
            dataset = %dataset,
            "Fetch failed after {} attempts: {}", self.max_retries, last_error
        );
        metrics.fetch_failures_total.inc();
        Err(last_error)
    }
}

#[async_trait]
impl DataSource for AbsClient {
    fn name(&self) -> &str {
        "abs_api"
    }

    async fn fetch(&self, dataset: Dataset, filters: &FetchFilters) -> FetchOutcome {
        FetchOutcome::from_result(self.fetch_rows(dataset, filters).await)
    }

    async fn probe(&self) -> ConnectionReport {
        let start = Instant::now();
        let sent = self
            .client
            .get(self.dataset_url(Dataset::Cpi))
            .query(&[("lastNObservations", "1")])
            .header(header::ACCEPT, SDMX_JSON)
            .send()
            .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match sent {
            Ok(response) => ConnectionReport::reachable(response.status().as_u16(), elapsed_ms),
            Err(e) => {
                warn!("ABS API connection probe failed: {}", e);
                ConnectionReport::unreachable(e.to_string(), elapsed_ms)
            }
        }
    }
}
