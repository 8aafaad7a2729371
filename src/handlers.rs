use crate::config::Config;
use crate::errors::AppError;
use crate::models::{AnalyzeRequest, CleanupAnalysis, RecordsAnalyzeRequest};
use crate::services::{analyze_tool_definition, validate_threshold, CleanupService};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    Json,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Fetches records and runs the analysis.
    pub service: CleanupService,
    /// Finished analyses keyed by `"{contact_limit}:{company_limit}:{threshold}"`.
    pub report_cache: Cache<String, CleanupAnalysis>,
}

fn cache_key(contact_limit: usize, company_limit: usize, threshold: f64) -> String {
    format!("{}:{}:{}", contact_limit, company_limit, threshold)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "crm-cleanup-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// POST /api/v1/cleanup/analyze
///
/// Fetches records from the MCP server and returns the report with
/// recommendations. Results are cached per parameter set unless
/// `force_refresh` is set.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<CleanupAnalysis>, AppError> {
    let threshold = validate_threshold(request.similarity_threshold)?
        .unwrap_or(state.service.analysis_config().similarity_threshold);
    let contact_limit = request.contact_limit.unwrap_or(state.config.contact_limit);
    let company_limit = request.company_limit.unwrap_or(state.config.company_limit);
    let key = cache_key(contact_limit, company_limit, threshold);

    if !request.force_refresh {
        if let Some(cached) = state.report_cache.get(&key).await {
            tracing::info!("Serving cached cleanup analysis for {}", key);
            return Ok(Json(cached));
        }
    }

    let analysis = state
        .service
        .analyze_crm_quality(contact_limit, company_limit, Some(threshold))
        .await?;
    state.report_cache.insert(key, analysis.clone()).await;

    Ok(Json(analysis))
}

/// POST /api/v1/cleanup/records
///
/// Analyzes records supplied in the request body. Nothing is cached.
pub async fn analyze_records(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecordsAnalyzeRequest>,
) -> Result<Json<CleanupAnalysis>, AppError> {
    tracing::info!(
        "Analyzing {} posted contacts and {} posted companies",
        request.contacts.len(),
        request.companies.len()
    );
    let analysis = state.service.analyze_records(
        &request.contacts,
        &request.companies,
        request.similarity_threshold,
    )?;
    Ok(Json(analysis))
}

/// GET /api/v1/cleanup/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    state.service.cleanup_summary_for_agent().await
}

/// GET /api/v1/cleanup/tool
pub async fn tool_definition(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(analyze_tool_definition(&state.config))
}
