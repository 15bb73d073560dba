use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    common::errors::{ApiError, RadioError},
    metadata::SearchResult,
    server::AppState,
};

const PATH: &str = "/api/search";
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
}

/// Checks the query string before anything goes upstream.
pub fn validate(params: &SearchParams) -> Result<(String, usize), ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::bad_request("Missing search query 'q'", PATH));
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::bad_request(
            format!("'limit' must be between 1 and {}", MAX_LIMIT),
            PATH,
        ));
    }

    Ok((query.to_string(), limit))
}

/// GET /api/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::debug!("GET /api/search: {:?}", params);
    let (query, limit) = validate(&params)?;

    let metadata = state
        .metadata
        .as_ref()
        .ok_or_else(|| ApiError::from_radio(&RadioError::MetadataUnavailable, PATH))?;

    let results = metadata
        .search(&query, limit)
        .await
        .map_err(|e| ApiError::from_radio(&e, PATH))?;

    Ok(Json(SearchResponse {
        count: results.len(),
        query,
        results,
    }))
}
