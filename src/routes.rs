use axum::{
    extract::{Query, State},
    response::{Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::jsonp::{self, Callback};
use crate::repo::{self, RepoRef};
use crate::types::*;
use crate::{scrape, search, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/search", get(cached_search_handler))
        .route("/api/search", get(search_handler))
        .route("/api/repo", get(repo_metadata_handler))
        .route("/api/repo/stats", get(repo_stats_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RepoSummary>>, ApiError> {
    let items = search::search_repositories(&state, &params).await?;
    Ok(Json(items))
}

async fn cached_search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    // Validate everything before touching the cache or GitHub.
    let (key, query) = search::cached_search_query(&params)?;
    let callback = Callback::parse(params.callback.as_deref())?;

    let payload = search::cached_search(&state, key, query).await?;
    jsonp::render(&*payload, callback.as_ref())
}

async fn repo_metadata_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RepoParams>,
) -> Result<Json<RepoMetadata>, ApiError> {
    let target = RepoRef::from_params(&params)?;
    Ok(Json(repo::repository_metadata(&state, &target).await?))
}

async fn repo_stats_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RepoParams>,
) -> Result<Json<RepoStats>, ApiError> {
    let target = RepoRef::from_params(&params)?;
    Ok(Json(scrape::repository_stats(&state, &target).await?))
}
