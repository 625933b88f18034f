//! Natural language query pipeline.
//!
//! This module provides:
//! - Query and result types
//! - Keyword capability matching
//! - Ordered intent classification and region extraction

pub mod classifier;
pub mod types;

pub use classifier::*;
pub use types::*;
