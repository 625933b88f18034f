//! Statistics data sources.
//!
//! Agents read live figures through the [`DataSource`] trait. Two
//! implementations ship with the crate:
//!
//! - [`AbsClient`]: the ABS data API over HTTP, with bounded retries and
//!   exponential backoff, parsing SDMX-JSON or delimited text responses.
//!
//! - [`OfflineSource`]: never reachable, so agents answer from their static
//!   fallback text.
//!
//! # Example
//!
//! ```ignore
//! use abs_agent::config::SourceConfig;
//! use abs_agent::query::Region;
//! use abs_agent::sources::{AbsClient, DataSource, Dataset, FetchFilters};
//!
//! let client = AbsClient::from_config(&SourceConfig::default())?;
//! let filters = FetchFilters::new().region(Some(Region::Nsw)).lookback(4);
//! let outcome = client.fetch(Dataset::Population, &filters).await;
//! ```

mod abs;
pub mod parse;
mod traits;

pub use abs::AbsClient;
pub use traits::*;
