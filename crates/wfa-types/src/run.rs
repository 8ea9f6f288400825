//! Workflow run state: the record a triggered execution mutates as it
//! progresses through the step state machine.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::step::StepOutput;

/// Overall status of a workflow run.
///
/// `SUCCESS` and `FAILED` are terminal and absorbing: once set, neither the
/// status nor `completed_at` on the owning [`WorkflowRun`] may change.
/// `PAUSED` is reserved — no transition in this specification's engine
/// produces it (see DESIGN.md).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Success,
    Failed,
    Paused,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStatus::Success | WorkflowStatus::Failed)
    }
}

/// Status of a single step's execution within a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

/// Result of executing one step within a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<StepOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn running(step_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Running,
            started_at,
            completed_at: None,
            output: None,
            error: None,
        }
    }
}

/// One execution of a [`crate::WorkflowDefinition`] triggered with a
/// specific payload.
///
/// `step_results` is keyed by step name with insertion order preserved —
/// readers rely on iteration order to find the single FAILED entry as the
/// last one recorded (see invariant 3 in spec.md §8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub workflow_id: String,
    pub status: WorkflowStatus,
    pub payload: serde_json::Value,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default)]
    pub step_results: IndexMap<String, StepResult>,
}

impl WorkflowRun {
    /// Construct a fresh PENDING run for a trigger.
    pub fn new_pending(workflow_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            uuid: None,
            id: None,
            workflow_id: workflow_id.into(),
            status: WorkflowStatus::Pending,
            payload,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
            step_results: IndexMap::new(),
        }
    }
}
