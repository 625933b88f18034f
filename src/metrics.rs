//! Prometheus-compatible metrics for the ABS agent service.
//!
//! Counters and histograms cover query routing and calls to the external
//! statistics source. Health types describe per-agent and per-source state.

use prometheus::{self, Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get or initialize the global metrics instance.
pub fn get_metrics() -> Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}

/// Latency buckets in seconds, 1ms to 60s. Fetches with retries can be slow.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ]
}

fn counter(name: &str, help: &str) -> IntCounter {
    IntCounter::new(name, help).expect("failed to create counter")
}

fn gauge(name: &str, help: &str) -> IntGauge {
    IntGauge::new(name, help).expect("failed to create gauge")
}

fn histogram(name: &str, help: &str) -> Histogram {
    Histogram::with_opts(HistogramOpts::new(name, help).buckets(default_latency_buckets()))
        .expect("failed to create histogram")
}

/// All metrics for the service.
pub struct Metrics {
    /// Prometheus registry for all metrics.
    pub registry: Registry,

    // =========================================================================
    // Counters
    // =========================================================================
    /// Queries received by the registry.
    pub queries_total: IntCounter,
    /// Queries no agent accepted.
    pub queries_unmatched_total: IntCounter,
    /// Queries that ended in a dispatch fault.
    pub query_faults_total: IntCounter,
    /// HTTP attempts made against the statistics source.
    pub fetch_attempts_total: IntCounter,
    /// Fetches that ended in failure after all attempts.
    pub fetch_failures_total: IntCounter,
    /// Answers served from static fallback text.
    pub fallback_responses_total: IntCounter,

    // =========================================================================
    // Gauges
    // =========================================================================
    /// Agents instantiated so far.
    pub agents_instantiated: IntGauge,
    /// Uptime in seconds.
    pub uptime_seconds: IntGauge,

    // =========================================================================
    // Histograms (durations in seconds)
    // =========================================================================
    /// End-to-end routing duration.
    pub query_duration_seconds: Histogram,
    /// Duration of one fetch including retries.
    pub fetch_duration_seconds: Histogram,

    /// Server start time.
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let queries_total = counter("abs_agent_queries_total", "Total number of queries routed");
        let queries_unmatched_total = counter(
            "abs_agent_queries_unmatched_total",
            "Total number of queries no agent accepted",
        );
        let query_faults_total = counter(
            "abs_agent_query_faults_total",
            "Total number of queries that failed during dispatch",
        );
        let fetch_attempts_total = counter(
            "abs_agent_fetch_attempts_total",
            "Total number of HTTP attempts against the statistics source",
        );
        let fetch_failures_total = counter(
            "abs_agent_fetch_failures_total",
            "Total number of fetches that failed after all attempts",
        );
        let fallback_responses_total = counter(
            "abs_agent_fallback_responses_total",
            "Total number of answers served from static fallback text",
        );

        let agents_instantiated = gauge(
            "abs_agent_agents_instantiated",
            "Number of agent instances created",
        );
        let uptime_seconds = gauge("abs_agent_uptime_seconds", "Server uptime in seconds");

        let query_duration_seconds = histogram(
            "abs_agent_query_duration_seconds",
            "Query routing duration in seconds",
        );
        let fetch_duration_seconds = histogram(
            "abs_agent_fetch_duration_seconds",
            "Statistics source fetch duration in seconds",
        );

        for collector in [
            Box::new(queries_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(queries_unmatched_total.clone()),
            Box::new(query_faults_total.clone()),
            Box::new(fetch_attempts_total.clone()),
            Box::new(fetch_failures_total.clone()),
            Box::new(fallback_responses_total.clone()),
            Box::new(agents_instantiated.clone()),
            Box::new(uptime_seconds.clone()),
            Box::new(query_duration_seconds.clone()),
            Box::new(fetch_duration_seconds.clone()),
        ] {
            registry
                .register(collector)
                .expect("failed to register metric");
        }

        Self {
            registry,
            queries_total,
            queries_unmatched_total,
            query_faults_total,
            fetch_attempts_total,
            fetch_failures_total,
            fallback_responses_total,
            agents_instantiated,
            uptime_seconds,
            query_duration_seconds,
            fetch_duration_seconds,
            start_time: Instant::now(),
        }
    }

    /// Update the uptime gauge.
    pub fn update_uptime(&self) {
        let uptime = self.start_time.elapsed();
        self.uptime_seconds.set(uptime.as_secs() as i64);
    }

    /// Export metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;
        self.update_uptime();

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Export metrics as JSON.
    pub fn export_json(&self) -> MetricsSnapshot {
        self.update_uptime();
        MetricsSnapshot {
            counters: MetricsCounters {
                queries_total: self.queries_total.get(),
                queries_unmatched_total: self.queries_unmatched_total.get(),
                query_faults_total: self.query_faults_total.get(),
                fetch_attempts_total: self.fetch_attempts_total.get(),
                fetch_failures_total: self.fetch_failures_total.get(),
                fallback_responses_total: self.fallback_responses_total.get(),
            },
            gauges: MetricsGauges {
                agents_instantiated: self.agents_instantiated.get(),
                uptime_seconds: self.uptime_seconds.get(),
            },
            histograms: MetricsHistograms {
                query_duration_seconds: HistogramSnapshot::from_prometheus(
                    &self.query_duration_seconds,
                ),
                fetch_duration_seconds: HistogramSnapshot::from_prometheus(
                    &self.fetch_duration_seconds,
                ),
            },
        }
    }

    /// Start a timer that records duration to a histogram when dropped.
    pub fn start_timer(histogram: &Histogram) -> HistogramTimer {
        HistogramTimer {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

/// Timer that records duration to a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.histogram.observe(duration.as_secs_f64());
    }
}

/// Snapshot of all metrics for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: MetricsCounters,
    pub gauges: MetricsGauges,
    pub histograms: MetricsHistograms,
}

/// Counter metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsCounters {
    pub queries_total: u64,
    pub queries_unmatched_total: u64,
    pub query_faults_total: u64,
    pub fetch_attempts_total: u64,
    pub fetch_failures_total: u64,
    pub fallback_responses_total: u64,
}

/// Gauge metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsGauges {
    pub agents_instantiated: i64,
    pub uptime_seconds: i64,
}

/// Histogram metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsHistograms {
    pub query_duration_seconds: HistogramSnapshot,
    pub fetch_duration_seconds: HistogramSnapshot,
}

/// Snapshot of a histogram for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
}

impl HistogramSnapshot {
    /// Create a snapshot from a prometheus histogram.
    pub fn from_prometheus(h: &Histogram) -> Self {
        let sample_count = h.get_sample_count();
        let sample_sum = h.get_sample_sum();
        let mean = if sample_count > 0 {
            Some(sample_sum / sample_count as f64)
        } else {
            None
        };
        Self {
            count: sample_count,
            sum: sample_sum,
            mean,
        }
    }
}

/// Health state enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    /// Convert to HTTP status code.
    pub fn to_status_code(self) -> u16 {
        match self {
            HealthState::Healthy => 200,
            HealthState::Degraded => 200,
            HealthState::Unhealthy => 503,
        }
    }

    /// Worst of two states.
    pub fn combine(self, other: HealthState) -> HealthState {
        use HealthState::*;
        match (self, other) {
            (Unhealthy, _) | (_, Unhealthy) => Unhealthy,
            (Degraded, _) | (_, Degraded) => Degraded,
            _ => Healthy,
        }
    }
}

/// Individual health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl HealthCheck {
    /// Create a healthy check with duration.
    pub fn healthy_with_duration(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: HealthState::Healthy,
            message: None,
            duration_ms: Some(duration_ms),
        }
    }

    /// Create a degraded check.
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthState::Degraded,
            message: Some(message.into()),
            duration_ms: None,
        }
    }
}
