//! Per-intent fetch policy.
//!
//! Each handled intent names the dataset it reads, how many periods to ask
//! for, and what to do when the source has nothing to give.

use serde::Serialize;

use crate::query::Intent;
use crate::sources::Dataset;

/// What a handler does when live data is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Answer from static text, successfully.
    Fallback,
    /// Report the fetch failure in the result.
    Propagate,
}

/// Fetch policy for one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentPolicy {
    pub intent: Intent,
    /// `None` means the handler never fetches.
    pub dataset: Option<Dataset>,
    /// Periods requested (`lastNObservations`).
    pub lookback: u32,
    /// Whether the fetch is narrowed to the region named in the query.
    pub regional: bool,
    pub on_unavailable: FailurePolicy,
}

// Economic indicators propagate fetch failures while every other intent
// falls back. Candidate for unification.
pub const INTENT_POLICIES: [IntentPolicy; 5] = [
    IntentPolicy {
        intent: Intent::Population,
        dataset: Some(Dataset::Population),
        lookback: 4,
        regional: true,
        on_unavailable: FailurePolicy::Fallback,
    },
    IntentPolicy {
        intent: Intent::Employment,
        dataset: Some(Dataset::LabourForce),
        lookback: 8,
        regional: false,
        on_unavailable: FailurePolicy::Fallback,
    },
    IntentPolicy {
        intent: Intent::Housing,
        dataset: Some(Dataset::BuildingApprovals),
        lookback: 12,
        regional: false,
        on_unavailable: FailurePolicy::Fallback,
    },
    IntentPolicy {
        intent: Intent::EconomicIndicator,
        dataset: Some(Dataset::Cpi),
        lookback: 8,
        regional: false,
        on_unavailable: FailurePolicy::Propagate,
    },
    IntentPolicy {
        intent: Intent::GenericDataRequest,
        dataset: None,
        lookback: 0,
        regional: false,
        on_unavailable: FailurePolicy::Fallback,
    },
];

/// Policy for an intent; `None` for intents no handler serves.
pub fn policy_for(intent: Intent) -> Option<&'static IntentPolicy> {
    INTENT_POLICIES.iter().find(|p| p.intent == intent)
}
