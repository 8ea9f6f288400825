//! PostgreSQL storage backend (C1, relational row in spec.md §4.1).
//!
//! One table per entity type, JSON columns for `payload`/`steps`/
//! `step_results`, a composite `(status, started_at)` index on
//! `workflow_runs`. This is the only backend required to support
//! efficient pagination natively — see [`PgWorkflowStorage::list_paginated`]
//! / [`PgRunStorage::list_paginated`] for the `uuid > :cursor ORDER BY
//! uuid ASC LIMIT :limit+1` algorithm from spec.md §4.1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sqlx::PgPool;
use wfa_types::{StepResult, WorkflowDefinition, WorkflowRun, WorkflowStatus};

use crate::error::StorageError;
use crate::traits::{generate_uuid, Page, RunStorage, WorkflowStorage};

#[derive(sqlx::FromRow)]
struct WorkflowRow {
    uuid: String,
    id: Option<String>,
    name: String,
    description: Option<String>,
    steps: serde_json::Value,
}

impl TryFrom<WorkflowRow> for WorkflowDefinition {
    type Error = StorageError;

    fn try_from(row: WorkflowRow) -> Result<Self, Self::Error> {
        Ok(WorkflowDefinition {
            uuid: Some(row.uuid),
            id: row.id,
            name: row.name,
            description: row.description,
            steps: serde_json::from_value(row.steps)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    uuid: String,
    id: Option<String>,
    workflow_id: String,
    status: String,
    payload: serde_json::Value,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
    step_results: serde_json::Value,
}

fn status_to_str(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Pending => "pending",
        WorkflowStatus::Running => "running",
        WorkflowStatus::Success => "success",
        WorkflowStatus::Failed => "failed",
        WorkflowStatus::Paused => "paused",
    }
}

fn status_from_str(s: &str) -> Result<WorkflowStatus, StorageError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StorageError::Backend(format!("unknown run status {s:?}: {e}")))
}

impl TryFrom<RunRow> for WorkflowRun {
    type Error = StorageError;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        let step_results: IndexMap<String, StepResult> =
            serde_json::from_value(row.step_results)?;
        Ok(WorkflowRun {
            uuid: Some(row.uuid),
            id: row.id,
            workflow_id: row.workflow_id,
            status: status_from_str(&row.status)?,
            payload: row.payload,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error: row.error,
            step_results,
        })
    }
}

/// Run `sqlx`'s embedded migrations (`migrations/`) against `pool`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::Backend(format!("migration failed: {e}")))
}

#[derive(Clone)]
pub struct PgWorkflowStorage {
    pool: PgPool,
}

impl PgWorkflowStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStorage for PgWorkflowStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowDefinition>, StorageError> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            "SELECT uuid, id, name, description, steps FROM workflow_definitions WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        row.map(WorkflowDefinition::try_from).transpose()
    }

    async fn create(&self, mut item: WorkflowDefinition) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        let steps = serde_json::to_value(&item.steps)?;
        sqlx::query(
            "INSERT INTO workflow_definitions (uuid, id, name, description, steps)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&uuid)
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&steps)
        .execute(&self.pool)
        .await?;
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowDefinition) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        let steps = serde_json::to_value(&item.steps)?;
        let result = sqlx::query(
            "UPDATE workflow_definitions SET id = $2, name = $3, description = $4, steps = $5
             WHERE uuid = $1",
        )
        .bind(&uuid)
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&steps)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM workflow_definitions WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<WorkflowDefinition>, StorageError> {
        let rows = sqlx::query_as::<_, WorkflowRow>(
            "SELECT uuid, id, name, description, steps FROM workflow_definitions ORDER BY uuid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorkflowDefinition::try_from).collect()
    }

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowDefinition>, StorageError> {
        let fetch_limit = i64::from(limit) + 1;
        let rows = sqlx::query_as::<_, WorkflowRow>(
            "SELECT uuid, id, name, description, steps FROM workflow_definitions
             WHERE uuid > COALESCE($1, '') ORDER BY uuid ASC LIMIT $2",
        )
        .bind(cursor)
        .bind(fetch_limit)
        .fetch_all(&self.pool)
        .await?;

        let mut items: Vec<WorkflowDefinition> = rows
            .into_iter()
            .map(WorkflowDefinition::try_from)
            .collect::<Result<_, _>>()?;

        let has_more = items.len() > limit as usize;
        if has_more {
            items.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            items.last().and_then(|w| w.uuid.clone())
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }
}

#[derive(Clone)]
pub struct PgRunStorage {
    pool: PgPool,
}

impl PgRunStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunStorage for PgRunStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowRun>, StorageError> {
        let row = sqlx::query_as::<_, RunRow>(
            "SELECT uuid, id, workflow_id, status, payload, started_at, completed_at, error, step_results
             FROM workflow_runs WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        row.map(WorkflowRun::try_from).transpose()
    }

    async fn create(&self, mut item: WorkflowRun) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        let step_results = serde_json::to_value(&item.step_results)?;
        sqlx::query(
            "INSERT INTO workflow_runs
                (uuid, id, workflow_id, status, payload, started_at, completed_at, error, step_results)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&uuid)
        .bind(&item.id)
        .bind(&item.workflow_id)
        .bind(status_to_str(item.status))
        .bind(&item.payload)
        .bind(item.started_at)
        .bind(item.completed_at)
        .bind(&item.error)
        .bind(&step_results)
        .execute(&self.pool)
        .await?;
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowRun) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        let step_results = serde_json::to_value(&item.step_results)?;
        let result = sqlx::query(
            "UPDATE workflow_runs
             SET id = $2, workflow_id = $3, status = $4, payload = $5, started_at = $6,
                 completed_at = $7, error = $8, step_results = $9
             WHERE uuid = $1",
        )
        .bind(&uuid)
        .bind(&item.id)
        .bind(&item.workflow_id)
        .bind(status_to_str(item.status))
        .bind(&item.payload)
        .bind(item.started_at)
        .bind(item.completed_at)
        .bind(&item.error)
        .bind(&step_results)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM workflow_runs WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<WorkflowRun>, StorageError> {
        let rows = sqlx::query_as::<_, RunRow>(
            "SELECT uuid, id, workflow_id, status, payload, started_at, completed_at, error, step_results
             FROM workflow_runs ORDER BY uuid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorkflowRun::try_from).collect()
    }

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowRun>, StorageError> {
        let fetch_limit = i64::from(limit) + 1;
        let rows = sqlx::query_as::<_, RunRow>(
            "SELECT uuid, id, workflow_id, status, payload, started_at, completed_at, error, step_results
             FROM workflow_runs WHERE uuid > COALESCE($1, '') ORDER BY uuid ASC LIMIT $2",
        )
        .bind(cursor)
        .bind(fetch_limit)
        .fetch_all(&self.pool)
        .await?;

        let mut items: Vec<WorkflowRun> =
            rows.into_iter().map(WorkflowRun::try_from).collect::<Result<_, _>>()?;

        let has_more = items.len() > limit as usize;
        if has_more {
            items.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            items.last().and_then(|r| r.uuid.clone())
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }
}
