//! HTTP binding.
//!
//! | Method | Path              | Operation                    |
//! |--------|-------------------|------------------------------|
//! | GET    | `/health`         | [`ContentService::health`]   |
//! | GET    | `/api/directory`  | [`ContentService::list_directory`] |
//! | GET    | `/api/content`    | [`ContentService::get_document`]   |
//! | GET    | `/api/search`     | [`ContentService::search_with`]    |
//! | POST   | `/api/reindex`    | [`ContentService::reindex`]  |
//!
//! Filesystem work runs on the blocking pool; a failed request answers with
//! a JSON error and never takes the server down.

use std::net::SocketAddr;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_content::ParsedDocument;
use folio_core::{DirectoryListing, ROOT_SENTINEL};
use folio_fts::{IndexStats, QueryMode, SearchParams, SearchResult};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::service::{ContentService, HealthReport};

/// State shared by all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    service: ContentService,
    shutdown: CancellationToken,
}

impl AppState {
    /// Bundle a service with the token that signals server shutdown.
    pub fn new(service: ContentService, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

/// Build the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/directory", get(directory))
        .route("/api/content", get(content))
        .route("/api/search", get(search))
        .route("/api/reindex", post(reindex))
        .with_state(state)
        .layer(cors)
}

/// Serve until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an I/O error if binding or serving fails.
pub async fn serve(
    service: ContentService,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    let app = router(AppState::new(service, shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    mode: Option<QueryMode>,
    limit: Option<usize>,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health())
}

async fn directory(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<DirectoryListing>, ApiError> {
    let path = query.path.unwrap_or_else(|| ROOT_SENTINEL.to_string());
    let listing =
        tokio::task::spawn_blocking(move || state.service.list_directory(&path)).await??;
    Ok(Json(listing))
}

async fn content(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ParsedDocument>, ApiError> {
    let path = query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'path' parameter"))?;
    let doc = tokio::task::spawn_blocking(move || state.service.get_document(&path)).await??;
    Ok(Json(doc))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let params = SearchParams {
        query: query.q,
        mode: query.mode,
        limit: query.limit,
    };
    Json(state.service.search_with(&params))
}

// A client that disconnects drops this future, which cancels the rebuild.
async fn reindex(State(state): State<AppState>) -> Result<Json<IndexStats>, ApiError> {
    let stats = state
        .service
        .reindex(&state.shutdown.child_token())
        .await?;
    Ok(Json(stats))
}
