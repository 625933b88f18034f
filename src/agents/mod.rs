//! Agents and the registry that routes queries to them.
//!
//! This module provides:
//! - The [`Agent`] trait and the optional [`HealthReporter`] capability
//! - [`AgentRegistry`]: priority-ordered routing with lazily created,
//!   single-instance agents
//! - [`DataAnalysisAgent`]: the statistics agent, driven by the
//!   [`INTENT_POLICIES`] table
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use abs_agent::agents::AgentRegistry;
//! use abs_agent::query::Query;
//! use abs_agent::sources::OfflineSource;
//!
//! let registry = AgentRegistry::with_default_agents(Arc::new(OfflineSource))?;
//! let result = registry.route(&Query::new("Population of Tasmania")).await;
//! assert_eq!(result.agent, "DataAnalysisAgent");
//! ```

mod data_agent;
mod policy;
pub mod registry;
pub mod responses;
mod traits;

pub use data_agent::{DataAnalysisAgent, DATA_AGENT_NAME};
pub use policy::{policy_for, FailurePolicy, IntentPolicy, INTENT_POLICIES};
pub use registry::{AgentFactory, AgentRegistry, SAMPLE_QUERIES};
pub use traits::*;
