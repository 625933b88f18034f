//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::agents::AgentRegistry;
use crate::api::handlers::{
    debug_registry_handler, health_handler, list_agents_handler, metrics_handler,
    metrics_json_handler, query_handler, root_handler, sample_queries_handler, ApiState,
};
use crate::config::ServerConfig;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// Allowed origins for CORS; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl From<&ServerConfig> for RestApiConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            enable_cors: config.enable_cors,
            cors_origins: config.cors_origins.clone(),
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - GET  /                - Service metadata
/// - GET  /health          - Registry and data source health
/// - GET  /agents          - Registered agent names
/// - POST /query           - Route a question
/// - GET  /test/abs        - Run the canned sample queries
/// - GET  /debug/registry  - Per-agent details
/// - GET  /metrics         - Prometheus exposition
/// - GET  /metrics/json    - Metrics snapshot as JSON
pub fn create_rest_router(registry: Arc<AgentRegistry>, config: &RestApiConfig) -> Router {
    let state = Arc::new(ApiState::new(registry));

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/agents", get(list_agents_handler))
        .route("/query", post(query_handler))
        .route("/test/abs", get(sample_queries_handler))
        .route("/debug/registry", get(debug_registry_handler))
        .route("/metrics", get(metrics_handler))
        .route("/metrics/json", get(metrics_json_handler))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if config.enable_cors {
        router.layer(cors_layer(&config.cors_origins))
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(parsed))
}
