//! Trigger ingress (C6): the only state-mutating entry point into the
//! system. Implements spec.md §4.6's six-step algorithm exactly, matching
//! `app/api/v1/endpoints/trigger.py::trigger_workflow`.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use wfa_bus::WorkflowTriggerEvent;
use wfa_types::{WorkflowRun, WorkflowStatus};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub workflow_id: String,
    #[serde(default)]
    pub payload: Value,
}

/// `POST /api/v1/trigger`
pub async fn trigger_workflow(
    State(state): State<AppState>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<Value>, ApiError> {
    // Step 1: read the definition (cache then storage); absent ⇒ 404.
    let cache_key = wfa_storage::cache::workflow_key(&request.workflow_id);
    let known = if let Some(cache) = &state.cache {
        if cache
            .get::<wfa_types::WorkflowDefinition>(&cache_key)
            .await
            .is_some()
        {
            true
        } else {
            state.workflow_storage.get(&request.workflow_id).await?.is_some()
        }
    } else {
        state.workflow_storage.get(&request.workflow_id).await?.is_some()
    };

    if !known {
        return Err(ApiError::NotFound(format!(
            "Workflow {} not found",
            request.workflow_id
        )));
    }

    // Step 2-3: construct and persist a PENDING run, assigning its uuid.
    let run = WorkflowRun::new_pending(request.workflow_id.clone(), request.payload.clone());
    let run_uuid = state.run_storage.create(run).await?;

    // Step 4: publish the trigger event, keyed by run_uuid.
    let event = WorkflowTriggerEvent {
        run_id: run_uuid.clone(),
        workflow_id: request.workflow_id.clone(),
        payload: request.payload,
    };

    if let Err(e) = state
        .producer
        .send(&state.bus_config.trigger_topic, &event, Some(&run_uuid))
        .await
    {
        // Step 5: publish failure fails the run, but it remains queryable.
        let mut failed = state
            .run_storage
            .get(&run_uuid)
            .await?
            .ok_or_else(|| ApiError::Internal("run vanished immediately after creation".to_string()))?;
        failed.status = WorkflowStatus::Failed;
        failed.error = Some(format!("Failed to queue workflow: {e}"));
        failed.completed_at = Some(chrono::Utc::now());
        state.run_storage.update(failed).await?;
        return Err(ApiError::Internal(format!("Failed to queue workflow: {e}")));
    }

    // Step 6.
    Ok(Json(json!({ "run_id": run_uuid, "status": "triggered" })))
}
