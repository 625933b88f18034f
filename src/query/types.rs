//! Types for the natural language query pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Intent
// ============================================================================

/// Closed set of intents a query can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "population_query")]
    Population,
    #[serde(rename = "employment_statistics")]
    Employment,
    #[serde(rename = "housing_trends")]
    Housing,
    #[serde(rename = "economic_indicators")]
    EconomicIndicator,
    #[serde(rename = "abs_data_request")]
    GenericDataRequest,
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "error")]
    Error,
}

impl Intent {
    /// Intents a data agent can assign after accepting a query.
    pub const HANDLED: [Intent; 5] = [
        Intent::Population,
        Intent::Employment,
        Intent::Housing,
        Intent::EconomicIndicator,
        Intent::GenericDataRequest,
    ];

    /// Wire label for this intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Population => "population_query",
            Self::Employment => "employment_statistics",
            Self::Housing => "housing_trends",
            Self::EconomicIndicator => "economic_indicators",
            Self::GenericDataRequest => "abs_data_request",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Region
// ============================================================================

/// Australian state or territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Nsw,
    Vic,
    Qld,
    Sa,
    Wa,
    Tas,
    Nt,
    Act,
}

impl Region {
    /// All regions in alias-matching order.
    pub const ALL: [Region; 8] = [
        Region::Nsw,
        Region::Vic,
        Region::Qld,
        Region::Sa,
        Region::Wa,
        Region::Tas,
        Region::Nt,
        Region::Act,
    ];

    /// ABS region code for the national aggregate.
    pub const NATIONAL_CODE: &'static str = "0";

    /// Short lowercase code, e.g. "nsw".
    pub fn code(&self) -> &'static str {
        match self {
            Self::Nsw => "nsw",
            Self::Vic => "vic",
            Self::Qld => "qld",
            Self::Sa => "sa",
            Self::Wa => "wa",
            Self::Tas => "tas",
            Self::Nt => "nt",
            Self::Act => "act",
        }
    }

    /// Full state or territory name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nsw => "New South Wales",
            Self::Vic => "Victoria",
            Self::Qld => "Queensland",
            Self::Sa => "South Australia",
            Self::Wa => "Western Australia",
            Self::Tas => "Tasmania",
            Self::Nt => "Northern Territory",
            Self::Act => "Australian Capital Territory",
        }
    }

    /// Lowercase aliases recognised in query text.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Nsw => &["new south wales", "nsw"],
            Self::Vic => &["victoria", "vic"],
            Self::Qld => &["queensland", "qld"],
            Self::Sa => &["south australia", "sa"],
            Self::Wa => &["western australia", "wa"],
            Self::Tas => &["tasmania", "tas"],
            Self::Nt => &["northern territory", "nt"],
            Self::Act => &["australian capital territory", "act", "canberra"],
        }
    }

    /// Numeric REGION dimension value used by the ABS data API.
    pub fn abs_code(&self) -> &'static str {
        match self {
            Self::Nsw => "1",
            Self::Vic => "2",
            Self::Qld => "3",
            Self::Sa => "4",
            Self::Wa => "5",
            Self::Tas => "6",
            Self::Nt => "7",
            Self::Act => "8",
        }
    }

    /// Parse a short code ("nsw", "VIC", ...).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Query
// ============================================================================

/// An inbound natural language question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Raw question text
    pub text: String,
    /// Opaque correlation token echoed back to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Text truncated for log lines.
    pub fn preview(&self) -> String {
        truncate_chars(&self.text, 100)
    }
}

/// Truncate to at most `max` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ============================================================================
// Query Result
// ============================================================================

/// Agent name reported when no agent accepted the query.
pub const UNKNOWN_AGENT: &str = "unknown";

/// Agent name reported when dispatch itself failed.
pub const ERROR_AGENT: &str = "error";

/// Outcome of processing one query.
///
/// `success` is false exactly when `error` is set or no agent matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub agent: String,
    pub intent: Intent,
    pub response: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// A successful answer.
    pub fn answered(agent: impl Into<String>, intent: Intent, response: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            intent,
            response: response.into(),
            success: true,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// A failed answer carrying the underlying error message.
    pub fn failed(
        agent: impl Into<String>,
        intent: Intent,
        response: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            intent,
            response: response.into(),
            success: false,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// No registered agent accepted the query.
    pub fn no_match() -> Self {
        Self {
            agent: UNKNOWN_AGENT.to_string(),
            intent: Intent::Unknown,
            response: "No suitable agent found for this query".to_string(),
            success: false,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Dispatch failed before an agent could produce a result.
    pub fn fault(error: impl fmt::Display) -> Self {
        let message = error.to_string();
        Self::failed(
            ERROR_AGENT,
            Intent::Error,
            format!("Error processing query: {}", message),
            message,
        )
    }

    /// True when this result came from the no-match path.
    pub fn is_no_match(&self) -> bool {
        self.agent == UNKNOWN_AGENT && self.intent == Intent::Unknown && self.error.is_none()
    }
}
