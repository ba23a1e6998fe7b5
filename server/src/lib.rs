use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use simcore::config::{fit_from_path, VectorizerArgs};
use simcore::{DocId, EngineError, Neighbor, SearchHandle};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Deserialize)]
pub struct SimilarParams {
    #[serde(default = "default_k")]
    pub k: usize,
}

// five posters per row in the original grid
fn default_k() -> usize { 5 }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub title: String,
    pub took_s: f64,
    pub results: Vec<RecommendHit>,
}

#[derive(Serialize)]
pub struct RecommendHit {
    pub row: DocId,
    pub title: String,
    pub distance: f32,
}

#[derive(Clone)]
pub struct AppState {
    pub handle: Arc<SearchHandle>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(err: EngineError) -> ApiError {
    let status = match &err {
        EngineError::DocumentNotFound(_) | EngineError::UnknownDocument { .. } => StatusCode::NOT_FOUND,
        EngineError::AmbiguousIdentity(_) => StatusCode::CONFLICT,
        EngineError::InsufficientNeighbors { .. } | EngineError::InvalidNeighborCount => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::EmptyCorpus | EngineError::EmptyVocabulary | EngineError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &err {
        EngineError::DocumentNotFound(title) => format!("movie not found: {title}"),
        other => other.to_string(),
    };
    (status, Json(serde_json::json!({ "error": message })))
}

/// Loads and fits the corpus, then builds the router. Fitting blocks until done.
pub fn build_app_from_corpus(input: &str, args: &VectorizerArgs) -> Result<Router> {
    let handle = fit_from_path(input, args.to_config()?)?;
    tracing::info!(num_docs = handle.len(), num_terms = handle.index().vocabulary().len(), "corpus ready");
    Ok(build_app(handle))
}

pub fn build_app(handle: SearchHandle) -> Router {
    let app_state = AppState { handle: Arc::new(handle) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/titles", get(titles_handler))
        .route("/recommend", get(recommend_handler))
        .route("/similar/:row", get(similar_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn titles_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.handle.index().identities().to_vec())
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let neighbors = state.handle.query_by_identity(&params.title, params.k).map_err(api_error)?;
    Ok(Json(respond(&state.handle, params.title, &neighbors, start)))
}

pub async fn similar_handler(
    State(state): State<AppState>,
    Path(row): Path<DocId>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let neighbors = state.handle.query(row, params.k).map_err(api_error)?;
    let title = state.handle.index().identity(row).unwrap_or_default().to_string();
    Ok(Json(respond(&state.handle, title, &neighbors, start)))
}

fn respond(handle: &SearchHandle, title: String, neighbors: &[Neighbor], start: std::time::Instant) -> RecommendResponse {
    let results = handle
        .resolve_neighbors(neighbors)
        .into_iter()
        .map(|r| RecommendHit { row: r.row, title: r.identity, distance: r.distance })
        .collect();
    RecommendResponse { title, took_s: start.elapsed().as_secs_f64(), results }
}
