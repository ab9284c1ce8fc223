//! Search handler.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::search::{SearchParams, SearchResult};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /search - Filtered shiur search.
///
/// At least one of `q` or `teacher` must be non-empty.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    tracing::debug!(q = %params.q, teacher = %params.teacher, "Search request");

    let results = state.search.search(params).await?;
    Ok(Json(results))
}
