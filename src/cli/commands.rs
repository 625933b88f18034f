//! CLI command dispatcher.
//!
//! This module dispatches CLI commands to either local or remote execution.

use abs_agent::{
    api::{AgentsResponse, HealthResponse, QueryResponse},
    Config,
};
use anyhow::Result;

use super::types::DiagnosticReport;
use super::{local, output, remote};

/// Execution mode for CLI commands.
#[derive(Clone)]
pub enum ExecutionMode {
    /// Execute in-process against a freshly built registry
    Local(Box<Config>),
    /// Execute against a running server
    Remote(String),
}

/// Run the query command.
pub async fn run_query(
    mode: ExecutionMode,
    text: String,
    session_id: Option<String>,
    json_output: bool,
) -> Result<()> {
    let result: QueryResponse = match mode {
        ExecutionMode::Local(config) => local::query(&config, text, session_id).await?,
        ExecutionMode::Remote(url) => remote::ApiClient::new(&url)?.query(text, session_id).await?,
    };
    output::print_query_result(&result, json_output);
    Ok(())
}

/// Run the agents command.
pub async fn run_agents(mode: ExecutionMode, json_output: bool) -> Result<()> {
    let result: AgentsResponse = match mode {
        ExecutionMode::Local(config) => local::agents(&config)?,
        ExecutionMode::Remote(url) => remote::ApiClient::new(&url)?.agents().await?,
    };
    output::print_agents(&result, json_output);
    Ok(())
}

/// Run the health command.
pub async fn run_health(mode: ExecutionMode, json_output: bool) -> Result<()> {
    let result: HealthResponse = match mode {
        ExecutionMode::Local(config) => local::health(&config).await?,
        ExecutionMode::Remote(url) => remote::ApiClient::new(&url)?.health().await?,
    };
    output::print_health(&result, json_output);
    Ok(())
}

/// Run the diagnose command.
pub async fn run_diagnose(mode: ExecutionMode, json_output: bool) -> Result<()> {
    let result: DiagnosticReport = match mode {
        ExecutionMode::Local(config) => local::diagnose(&config).await?,
        ExecutionMode::Remote(url) => remote::ApiClient::new(&url)?.diagnose().await?,
    };
    output::print_diagnostics(&result, json_output);
    Ok(())
}
