//! REST API module.
//!
//! Exposes query routing, health and diagnostics over HTTP.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
