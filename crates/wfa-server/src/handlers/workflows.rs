//! Workflow definition endpoints (spec.md §6), matching
//! `app/api/v1/endpoints/workflows.py`.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use wfa_types::WorkflowDefinition;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/v1/workflows`
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(workflow): Json<WorkflowDefinition>,
) -> Result<Json<Value>, ApiError> {
    workflow.validate()?;
    let workflow_id = state.workflow_storage.create(workflow).await?;
    Ok(Json(json!({
        "message": "Workflow created successfully",
        "workflow_id": workflow_id,
    })))
}

/// `GET /api/v1/workflows/{uuid}`
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<WorkflowDefinition>, ApiError> {
    if let Some(cache) = &state.cache {
        if let Some(cached) = cache.get::<WorkflowDefinition>(&wfa_storage::cache::workflow_key(&uuid)).await {
            return Ok(Json(cached));
        }
    }

    let workflow = state
        .workflow_storage
        .get(&uuid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("workflow {uuid} not found")))?;

    if let Some(cache) = &state.cache {
        cache
            .set(
                &wfa_storage::cache::workflow_key(&uuid),
                &workflow,
                wfa_storage::cache::WORKFLOW_TTL_SECS,
            )
            .await;
    }

    Ok(Json(workflow))
}
