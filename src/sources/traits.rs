//! Data source trait definitions and common types.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::query::Region;

/// Statistical datasets the agents know how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// Consumer Price Index
    Cpi,
    /// Estimated resident population, quarterly
    Population,
    /// Labour force survey
    LabourForce,
    /// Building approvals
    BuildingApprovals,
}

impl Dataset {
    /// Dataflow identifier on the ABS data API.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cpi => "CPI",
            Self::Population => "ERP_Q",
            Self::LabourForce => "LF",
            Self::BuildingApprovals => "BA",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Wire format requested from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// SDMX-JSON
    #[default]
    Json,
    /// Delimited text
    Csv,
}

/// Filters applied to a dataset fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFilters {
    /// Restrict to one state or territory
    pub region: Option<Region>,
    /// Only the latest N periods
    pub lookback_periods: Option<u32>,
    /// Only observations updated after this timestamp (ISO 8601)
    pub updated_after: Option<String>,
    pub format: ResponseFormat,
}

impl FetchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: Option<Region>) -> Self {
        self.region = region;
        self
    }

    pub fn lookback(mut self, periods: u32) -> Self {
        self.lookback_periods = Some(periods);
        self
    }

    pub fn updated_after(mut self, timestamp: impl Into<String>) -> Self {
        self.updated_after = Some(timestamp.into());
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}

/// One row of tabular data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Dimension id -> value id (e.g. "REGION" -> "1")
    pub dimensions: BTreeMap<String, String>,
    /// Observed value, if numeric
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(value: Option<f64>) -> Self {
        Self {
            dimensions: BTreeMap::new(),
            value,
        }
    }

    pub fn with_dimension(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(id.into(), value.into());
        self
    }

    /// Reporting period, when the source supplies one.
    pub fn period(&self) -> Option<&str> {
        self.dimensions.get("TIME_PERIOD").map(String::as_str)
    }
}

/// Result of asking a source for data.
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one row came back
    Rows(Vec<Observation>),
    /// The source answered but had nothing (including "dataset not found")
    Empty,
    /// The source could not be reached or answered with an error
    Failed(SourceError),
}

impl FetchOutcome {
    /// Normalise a raw fetch result; an empty row set becomes [`FetchOutcome::Empty`].
    pub fn from_result(result: std::result::Result<Vec<Observation>, SourceError>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => Self::Empty,
            Ok(rows) => Self::Rows(rows),
            Err(e) => Self::Failed(e),
        }
    }

    pub fn is_rows(&self) -> bool {
        matches!(self, Self::Rows(_))
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            _ => 0,
        }
    }

    /// Short label for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rows(_) => "rows",
            Self::Empty => "empty",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub connection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConnectionReport {
    pub fn reachable(status_code: u16, response_time_ms: u64) -> Self {
        Self {
            connection: (200..300).contains(&status_code),
            status_code: Some(status_code),
            response_time_ms,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn unreachable(error: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            connection: false,
            status_code: None,
            response_time_ms,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

/// External statistics source.
///
/// Implementations never panic on bad input; every problem is reported as
/// [`FetchOutcome::Failed`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name for logs and health output.
    fn name(&self) -> &str;

    /// Fetch rows for a dataset.
    async fn fetch(&self, dataset: Dataset, filters: &FetchFilters) -> FetchOutcome;

    /// Check whether the source is reachable.
    async fn probe(&self) -> ConnectionReport;
}

/// Source that is always unavailable. Agents built on it answer from their
/// static fallbacks.
#[derive(Debug, Clone, Default)]
pub struct OfflineSource;

#[async_trait]
impl DataSource for OfflineSource {
    fn name(&self) -> &str {
        "offline"
    }

    async fn fetch(&self, dataset: Dataset, _filters: &FetchFilters) -> FetchOutcome {
        FetchOutcome::Failed(SourceError::Transport(format!(
            "offline mode: {} not fetched",
            dataset.id()
        )))
    }

    async fn probe(&self) -> ConnectionReport {
        ConnectionReport::unreachable("offline mode", 0)
    }
}
