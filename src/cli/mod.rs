//! CLI module for the abs-agent command-line interface.
//!
//! Commands run either locally against an in-process registry or
//! remotely against a running server's REST API.

mod commands;
mod local;
mod output;
mod remote;
pub mod types;

pub use commands::*;
pub use local::build_registry;
