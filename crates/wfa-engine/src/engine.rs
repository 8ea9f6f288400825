//! Execution engine (C4): drives one run to completion, implementing the
//! state machine in spec.md §4.4 exactly — `engine.py::execute_workflow`
//! generalized to a trait-based connector registry and Rust's `Result`
//! idiom instead of bare exceptions.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use wfa_storage::{RunStorage, WorkflowStorage};
use wfa_types::{initial_context, StepResult, StepStatus, WorkflowStatus};

use crate::connector::ConnectorRegistry;
use crate::error::ExecutionEngineError;

/// Drives workflow runs through the step state machine described in
/// spec.md §4.4. Holds no per-run state — safe to share across
/// concurrently-executing runs via `Arc<ExecutionEngine>`.
pub struct ExecutionEngine {
    workflow_storage: Arc<dyn WorkflowStorage>,
    run_storage: Arc<dyn RunStorage>,
    connectors: Arc<ConnectorRegistry>,
}

impl ExecutionEngine {
    pub fn new(
        workflow_storage: Arc<dyn WorkflowStorage>,
        run_storage: Arc<dyn RunStorage>,
        connectors: Arc<ConnectorRegistry>,
    ) -> Self {
        Self {
            workflow_storage,
            run_storage,
            connectors,
        }
    }

    /// Execute the run identified by `run_uuid`. Never returns an `Err`
    /// for domain-level failures — a failing step or missing workflow
    /// transitions the run to FAILED and persists it; `Err` is reserved
    /// for storage I/O bubbling out of a persistence call the spec
    /// requires (the "three points minimum" in spec.md §4.4).
    pub async fn execute_run(&self, run_uuid: &str) -> Result<(), ExecutionEngineError> {
        let Some(mut run) = self.run_storage.get(run_uuid).await? else {
            error!(run_uuid, "workflow run not found, nothing to execute");
            return Ok(());
        };

        // Idempotency (spec.md §7): a run already in a terminal status is
        // a no-op. This covers replayed trigger events (S6) regardless of
        // whether the caller is the worker or a direct invocation.
        if run.status.is_terminal() {
            info!(run_uuid, status = ?run.status, "run already terminal, skipping");
            return Ok(());
        }

        let Some(workflow) = self.workflow_storage.get(&run.workflow_id).await? else {
            error!(run_uuid, workflow_id = %run.workflow_id, "workflow not found");
            run.status = WorkflowStatus::Failed;
            run.error = Some(format!("workflow {} not found", run.workflow_id));
            run.completed_at = Some(Utc::now());
            self.run_storage.update(run).await?;
            return Ok(());
        };

        info!(run_uuid, workflow_id = %run.workflow_id, "starting workflow run");
        run.status = WorkflowStatus::Running;
        self.run_storage.update(run.clone()).await?;

        let mut context = initial_context(&run.payload);

        for step in &workflow.steps {
            let started_at = Utc::now();
            info!(run_uuid, step = step.name(), connector = step.connector_type(), "executing step");

            let connector = match self.connectors.get(step.connector_type()) {
                Ok(c) => c,
                Err(e) => {
                    self.fail_run(&mut run, step.name(), started_at, e.to_string())
                        .await?;
                    return Ok(());
                }
            };

            match connector.execute(step, &context).await {
                Ok(output) => {
                    let completed_at = Utc::now();
                    let output_value = serde_json::to_value(&output).unwrap_or(serde_json::Value::Null);
                    run.step_results.insert(
                        step.name().to_string(),
                        StepResult {
                            step_name: step.name().to_string(),
                            status: StepStatus::Success,
                            started_at,
                            completed_at: Some(completed_at),
                            output: Some(output),
                            error: None,
                        },
                    );
                    // Edge case (spec.md §4.4): a falsy output adds no
                    // context entry. Connector outputs are never falsy in
                    // this closed registry, so this never actually fires
                    // today, but it keeps the contract honest if a future
                    // connector can return one.
                    if !output_value.is_null() {
                        context.insert(step.name().to_string(), output_value);
                    }
                    self.run_storage.update(run.clone()).await?;
                }
                Err(e) => {
                    warn!(run_uuid, step = step.name(), error = %e, "step failed");
                    self.fail_run(&mut run, step.name(), started_at, e.to_string())
                        .await?;
                    return Ok(());
                }
            }
        }

        run.status = WorkflowStatus::Success;
        run.completed_at = Some(Utc::now());
        self.run_storage.update(run).await?;
        info!(run_uuid, "workflow run completed successfully");
        Ok(())
    }

    async fn fail_run(
        &self,
        run: &mut wfa_types::WorkflowRun,
        step_name: &str,
        started_at: chrono::DateTime<Utc>,
        message: String,
    ) -> Result<(), ExecutionEngineError> {
        let completed_at = Utc::now();
        run.step_results.insert(
            step_name.to_string(),
            StepResult {
                step_name: step_name.to_string(),
                status: StepStatus::Failed,
                started_at,
                completed_at: Some(completed_at),
                output: None,
                error: Some(message.clone()),
            },
        );
        run.status = WorkflowStatus::Failed;
        run.error = Some(message);
        run.completed_at = Some(completed_at);
        self.run_storage.update(run.clone()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use wfa_storage::memory::{InMemoryRunStorage, InMemoryWorkflowStorage};
    use wfa_types::{DelayConfig, Step, WebhookConfig, WorkflowDefinition, WorkflowRun};

    fn engine() -> (ExecutionEngine, Arc<InMemoryWorkflowStorage>, Arc<InMemoryRunStorage>) {
        let wf_storage = Arc::new(InMemoryWorkflowStorage::new());
        let run_storage = Arc::new(InMemoryRunStorage::new());
        let engine = ExecutionEngine::new(
            wf_storage.clone(),
            run_storage.clone(),
            Arc::new(ConnectorRegistry::new()),
        );
        (engine, wf_storage, run_storage)
    }

    #[tokio::test]
    async fn missing_run_is_a_no_op() {
        let (engine, _wf, _run) = engine();
        engine.execute_run("does-not-exist").await.unwrap();
    }

    #[tokio::test]
    async fn missing_workflow_fails_the_run() {
        let (engine, _wf, run_storage) = engine();
        let run = WorkflowRun::new_pending("ghost", json!({}));
        let run_uuid = run_storage.create(run).await.unwrap();

        engine.execute_run(&run_uuid).await.unwrap();

        let loaded = run_storage.get(&run_uuid).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowStatus::Failed);
        assert!(loaded.error.unwrap().contains("ghost"));
        assert!(loaded.completed_at.is_some());
    }

    #[tokio::test]
    async fn empty_step_list_is_immediate_success() {
        let (engine, wf_storage, run_storage) = engine();
        // Construct directly: WorkflowDefinition::validate rejects empty
        // step lists at create time, but the engine must still tolerate
        // this edge case per spec.md §4.4 if one slips through.
        let wf_uuid = {
            let mut wf = WorkflowDefinition {
                uuid: None,
                id: None,
                name: "empty".to_string(),
                description: None,
                steps: vec![],
            };
            wf.uuid = Some("wf-empty".to_string());
            wf_storage.create(wf).await.unwrap()
        };
        let run = WorkflowRun::new_pending(wf_uuid, json!({}));
        let run_uuid = run_storage.create(run).await.unwrap();

        engine.execute_run(&run_uuid).await.unwrap();

        let loaded = run_storage.get(&run_uuid).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowStatus::Success);
        assert!(loaded.step_results.is_empty());
    }

    #[tokio::test]
    async fn context_threading_across_two_delay_steps() {
        let (engine, wf_storage, run_storage) = engine();
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "two-step".to_string(),
            description: None,
            steps: vec![
                Step::Delay {
                    name: "s1".to_string(),
                    config: DelayConfig { duration: 0 },
                },
                Step::Delay {
                    name: "s2".to_string(),
                    config: DelayConfig { duration: 0 },
                },
            ],
        };
        let wf_uuid = wf_storage.create(wf).await.unwrap();
        let run = WorkflowRun::new_pending(wf_uuid, json!({}));
        let run_uuid = run_storage.create(run).await.unwrap();

        engine.execute_run(&run_uuid).await.unwrap();

        let loaded = run_storage.get(&run_uuid).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowStatus::Success);
        assert_eq!(loaded.step_results.len(), 2);
        assert_eq!(loaded.step_results["s1"].status, StepStatus::Success);
        assert_eq!(loaded.step_results["s2"].status, StepStatus::Success);
        // Invariant 2 / testable property 2: definition order preserved.
        let names: Vec<_> = loaded.step_results.keys().collect();
        assert_eq!(names, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn fail_fast_stops_after_first_failing_step() {
        let (engine, wf_storage, run_storage) = engine();
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "fail-fast".to_string(),
            description: None,
            steps: vec![
                Step::Delay {
                    name: "s1".to_string(),
                    config: DelayConfig { duration: 0 },
                },
                Step::Webhook {
                    name: "s2".to_string(),
                    config: WebhookConfig {
                        url: "not a valid url at all".to_string(),
                        method: "GET".to_string(),
                        headers: HashMap::new(),
                        body: json!({}),
                    },
                },
            ],
        };
        let wf_uuid = wf_storage.create(wf).await.unwrap();
        let run = WorkflowRun::new_pending(wf_uuid, json!({}));
        let run_uuid = run_storage.create(run).await.unwrap();

        engine.execute_run(&run_uuid).await.unwrap();

        let loaded = run_storage.get(&run_uuid).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowStatus::Failed);
        assert_eq!(loaded.step_results.len(), 2);
        assert_eq!(loaded.step_results["s1"].status, StepStatus::Success);
        assert_eq!(loaded.step_results["s2"].status, StepStatus::Failed);
        // Invariant 3: FAILED entry is the last in insertion order.
        let names: Vec<_> = loaded.step_results.keys().collect();
        assert_eq!(names.last(), Some(&&"s2".to_string()));
    }

    #[tokio::test]
    async fn replaying_a_terminal_run_is_a_no_op() {
        let (engine, wf_storage, run_storage) = engine();
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![Step::Delay {
                name: "s1".to_string(),
                config: DelayConfig { duration: 0 },
            }],
        };
        let wf_uuid = wf_storage.create(wf).await.unwrap();
        let run = WorkflowRun::new_pending(wf_uuid, json!({}));
        let run_uuid = run_storage.create(run).await.unwrap();

        engine.execute_run(&run_uuid).await.unwrap();
        let first = run_storage.get(&run_uuid).await.unwrap().unwrap();
        assert_eq!(first.status, WorkflowStatus::Success);

        // Second delivery of the same trigger event (S6).
        engine.execute_run(&run_uuid).await.unwrap();
        let second = run_storage.get(&run_uuid).await.unwrap().unwrap();

        assert_eq!(second.status, first.status);
        assert_eq!(second.completed_at, first.completed_at);
        assert_eq!(second.step_results, first.step_results);
    }
}
