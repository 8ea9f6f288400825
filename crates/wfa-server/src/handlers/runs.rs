//! Run query endpoints (spec.md §6), matching
//! `app/api/v1/endpoints/runs.py`: read-through cache in front of
//! storage, cursor pagination on the list endpoint.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use wfa_types::WorkflowRun;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// `GET /api/v1/runs/{uuid}`
pub async fn get_run(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<WorkflowRun>, ApiError> {
    if let Some(cache) = &state.cache {
        if let Some(cached) = cache.get::<WorkflowRun>(&wfa_storage::cache::run_key(&uuid)).await {
            return Ok(Json(cached));
        }
    }

    let run = state
        .run_storage
        .get(&uuid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workflow run not found".to_string()))?;

    if let Some(cache) = &state.cache {
        cache
            .set(&wfa_storage::cache::run_key(&uuid), &run, wfa_storage::cache::RUN_TTL_SECS)
            .await;
    }

    Ok(Json(run))
}

/// `GET /api/v1/runs` — cursor-based pagination over `uuid`, clamped to
/// `[1, 200]` with `DEFAULT_PAGE_LIMIT` as the default (spec.md §6).
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<ListRunsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.default_page_limit)
        .clamp(1, 200);

    let page = state
        .run_storage
        .list_paginated(limit, params.cursor.as_deref())
        .await?;

    Ok(Json(json!({
        "items": page.items,
        "next_cursor": page.next_cursor,
        "limit": limit,
    })))
}
