//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use abs_agent::api::{AgentsResponse, HealthResponse, QueryResponse};
use serde::Serialize;

use super::types::DiagnosticReport;

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

/// Print a routed query result.
pub fn print_query_result(result: &QueryResponse, json: bool) {
    if json {
        print_json(result);
        return;
    }

    let r = &result.result;
    println!("Agent: {}", r.agent);
    println!("Intent: {}", r.intent);
    println!("Success: {}", r.success);
    if let Some(session_id) = &result.session_id {
        println!("Session: {}", session_id);
    }
    if let Some(error) = &r.error {
        println!("Error: {}", error);
    }
    println!("\n{}", r.response);
}

/// Print registered agents.
pub fn print_agents(result: &AgentsResponse, json: bool) {
    if json {
        print_json(result);
        return;
    }

    println!("{} registered agent(s):", result.count);
    for name in &result.agents {
        println!("  - {}", name);
    }
}

/// Print health status.
pub fn print_health(result: &HealthResponse, json: bool) {
    if json {
        print_json(result);
        return;
    }

    println!("Status: {:?}", result.status);
    println!("Agents: {}", result.details.total_agents);
    for (name, health) in &result.details.agents {
        println!(
            "  {} {:?} (instance created: {})",
            name, health.status, health.instance_created
        );
        if let Some(error) = &health.error {
            println!("    error: {}", error);
        }
        for check in &health.checks {
            println!("    {}: {:?}", check.name, check.status);
        }
        if let Some(source) = &health.data_source {
            println!(
                "    data source: connected={} ({}ms)",
                source.connection, source.response_time_ms
            );
        }
    }
}

/// Print the diagnostic report.
pub fn print_diagnostics(report: &DiagnosticReport, json: bool) {
    if json {
        print_json(report);
        return;
    }

    println!("Registry");
    println!("  Registered agents: {:?}", report.registered_agents);
    for (name, info) in &report.agent_details {
        println!(
            "  {} {} status={:?} instantiated={} priority={}",
            mark(info.error.is_none()),
            name,
            info.status,
            info.instantiated,
            info.priority
        );
        if let Some(error) = &info.error {
            println!("    error: {}", error);
        }
    }

    println!("\nClassification");
    for row in &report.classifications {
        let region = row
            .region
            .map(|r| r.code().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:<45} intent={:<12} region={}",
            mark(row.can_handle),
            row.query,
            row.intent.as_str(),
            region
        );
    }

    println!("\nData source");
    match &report.connection {
        Some(c) if c.connection => println!(
            "  {} connected ({}ms, status {})",
            mark(true),
            c.response_time_ms,
            c.status_code.unwrap_or_default()
        ),
        Some(c) => println!(
            "  {} unreachable ({}ms): {}",
            mark(false),
            c.response_time_ms,
            c.error
                .clone()
                .or_else(|| c.status_code.map(|s| format!("HTTP {}", s)))
                .unwrap_or_default()
        ),
        None => println!("  not reported"),
    }

    println!("\nSample queries");
    for sample in &report.samples {
        println!(
            "  {} {:<45} agent={} intent={} chars={}",
            mark(sample.success),
            sample.query,
            sample.agent,
            sample.intent.as_str(),
            sample.response_length
        );
        if let Some(error) = &sample.error {
            println!("    error: {}", error);
        }
    }
}
