use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_cleanup_api::config::Config;
use crm_cleanup_api::handlers::{self, AppState};
use crm_cleanup_api::mcp_client::{McpClient, McpRecordSource};
use crm_cleanup_api::services::CleanupService;

/// Main entry point for the cleanup service.
///
/// Initializes tracing, loads configuration, builds the MCP record source and
/// report cache, and serves the HTTP routes behind rate limiting.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_cleanup_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let client = McpClient::new(config.mcp_url.clone())?;
    tracing::info!("MCP client initialized: {}", config.mcp_url);
    let source = Arc::new(McpRecordSource::new(client));
    let service = CleanupService::new(source, config.analysis());

    let report_cache = Cache::builder()
        .time_to_live(Duration::from_secs(config.report_cache_ttl_secs))
        .max_capacity(100)
        .build();
    tracing::info!(
        "Report cache initialized ({}s TTL)",
        config.report_cache_ttl_secs
    );

    let app_state = Arc::new(AppState {
        config: config.clone(),
        service,
        report_cache,
    });

    // 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        .route("/api/v1/cleanup/analyze", post(handlers::analyze))
        .route("/api/v1/cleanup/records", post(handlers::analyze_records))
        .route("/api/v1/cleanup/summary", get(handlers::summary))
        .route("/api/v1/cleanup/tool", get(handlers::tool_definition))
        .layer(
            ServiceBuilder::new()
                // Posted record sets can be large; cap at 5MB
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
