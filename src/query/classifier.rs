//! Keyword-based capability matching, intent classification and region
//! extraction.
//!
//! Everything here is a case-insensitive substring test over fixed keyword
//! lists. Evaluation order is part of the contract: the first intent group
//! that matches wins, and the first region whose aliases match wins.

use super::types::{Intent, Region};

// ============================================================================
// Capability Matcher
// ============================================================================

/// Decides whether an agent can address a query.
pub trait CapabilityMatcher: Send + Sync {
    fn can_handle(&self, query: &str) -> bool;
}

/// Matches a query when it contains any keyword from a fixed list.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Create a matcher. Keywords are lowercased once here.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Matcher for the statistics domain.
    pub fn statistics_domain() -> Self {
        Self::new(DOMAIN_KEYWORDS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl CapabilityMatcher for KeywordMatcher {
    fn can_handle(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.keywords.iter().any(|k| query_lower.contains(k.as_str()))
    }
}

// ============================================================================
// Intent Classifier
// ============================================================================

/// One ordered rule: any keyword hit assigns `intent`.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

/// Classifies accepted queries into an [`Intent`] by ordered keyword groups.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: &'static [IntentRule],
    default_intent: Intent,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Classifier with the statistics rule set: population, employment,
    /// housing, economic, then the generic default.
    pub fn new() -> Self {
        Self {
            rules: INTENT_RULES,
            default_intent: Intent::GenericDataRequest,
        }
    }

    /// Classify a query. Always returns an intent.
    pub fn classify(&self, query: &str) -> Intent {
        self.matching_rule(query)
            .map(|rule| rule.intent)
            .unwrap_or(self.default_intent)
    }

    /// The rule that fired for a query, if any.
    pub fn matching_rule(&self, query: &str) -> Option<&IntentRule> {
        let query_lower = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| query_lower.contains(k)))
    }
}

// ============================================================================
// Region Extraction
// ============================================================================

/// Find the first region whose aliases occur in the query.
///
/// Regions are scanned in [`Region::ALL`] order and aliases are plain
/// substrings, so short codes also match inside longer words.
pub fn extract_region(query: &str) -> Option<Region> {
    let query_lower = query.to_lowercase();
    Region::ALL
        .into_iter()
        .find(|region| region.aliases().iter().any(|a| query_lower.contains(a)))
}

// ============================================================================
// Keyword tables
// ============================================================================

const DOMAIN_KEYWORDS: &[&str] = &[
    "population",
    "employment",
    "unemployment",
    "housing",
    "cpi",
    "consumer price index",
    "labour force",
    "statistics",
    "new south wales",
    "nsw",
    "victoria",
    "queensland",
    "australia",
    "abs",
    "bureau of statistics",
    "economic",
    "trends",
    "data",
];

const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Population,
        keywords: &["population", "people", "residents"],
    },
    IntentRule {
        intent: Intent::Employment,
        keywords: &["employment", "unemployment", "jobs", "labour", "workforce"],
    },
    IntentRule {
        intent: Intent::Housing,
        keywords: &["housing", "property", "building", "construction"],
    },
    IntentRule {
        intent: Intent::EconomicIndicator,
        keywords: &["cpi", "inflation", "price", "economic"],
    },
];
