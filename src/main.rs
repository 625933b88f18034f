//! ABS Agent Server Entry Point

use std::sync::Arc;

use abs_agent::{create_rest_router, Config, RestApiConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// abs-agent: routes statistics questions to ABS data agents
#[derive(Parser, Debug)]
#[command(name = "abs-agent")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Connect to a running abs-agent server
    #[arg(short, long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default behavior)
    Serve {
        /// Bind address. If not specified, uses config file value.
        #[arg(long)]
        host: Option<String>,
        /// HTTP port. If not specified, uses config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
        /// Never contact the ABS API; answer from static text only
        #[arg(long)]
        offline: bool,
    },
    /// Route a single question
    Query {
        /// Question text
        query: String,
        /// Session id echoed back in the result
        #[arg(short, long)]
        session: Option<String>,
    },
    /// List registered agents
    Agents,
    /// Check registry and data source health
    Health,
    /// Registration, classification, connectivity and sample query report
    Diagnose,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // For CLI commands (non-serve), use minimal logging
    let is_serve = matches!(args.command, Some(Command::Serve { .. }) | None);

    if !is_serve {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        Some(Command::Serve {
            host,
            port,
            json_logs,
            offline,
        }) => run_server(&args.config, host, port, json_logs, offline).await,
        None => run_server(&args.config, None, None, false, false).await,
        Some(command) => {
            let mode = execution_mode(&args.remote, &args.config)?;
            match command {
                Command::Query { query, session } => {
                    cli::run_query(mode, query, session, args.json).await
                }
                Command::Agents => cli::run_agents(mode, args.json).await,
                Command::Health => cli::run_health(mode, args.json).await,
                Command::Diagnose => cli::run_diagnose(mode, args.json).await,
                Command::Serve { .. } => Ok(()),
            }
        }
    }
}

fn execution_mode(
    remote: &Option<String>,
    config_path: &Option<String>,
) -> anyhow::Result<cli::ExecutionMode> {
    Ok(match remote {
        Some(url) => cli::ExecutionMode::Remote(url.clone()),
        None => cli::ExecutionMode::Local(Box::new(load_config(config_path)?)),
    })
}

fn load_config(path: &Option<String>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    })
}

async fn run_server(
    config_path: &Option<String>,
    host: Option<String>,
    port: Option<u16>,
    json_logs: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    // Initialize tracing for server mode
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if json_logs || config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting ABS Agent v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        base_url = %config.source.base_url,
        max_retries = config.source.max_retries,
        offline,
        "Configuration loaded"
    );

    let registry = cli::build_registry(&config, offline)?;
    tracing::info!(agents = ?registry.list_agents(), "Agent registry initialized");

    let router = create_rest_router(Arc::new(registry), &RestApiConfig::from(&config.server));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
