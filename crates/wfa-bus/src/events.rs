//! Event schemas carried on the bus (spec.md §6), matching
//! `app/messaging/events.py`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wfa_types::WorkflowStatus;

/// Published by the trigger ingress (C6) on topic `workflow.trigger`,
/// keyed by `run_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowTriggerEvent {
    pub run_id: String,
    pub workflow_id: String,
    pub payload: Value,
}

/// Published by the worker loop (C7) on topic `workflow.completed` once a
/// run reaches a terminal status. `error` is present iff `status ==
/// FAILED` — advisory only, the run record in storage is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowCompletedEvent {
    pub run_id: String,
    pub workflow_id: String,
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completed_event_omits_error_when_absent() {
        let event = WorkflowCompletedEvent {
            run_id: "r1".to_string(),
            workflow_id: "w1".to_string(),
            status: WorkflowStatus::Success,
            error: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("error").is_none());
    }

    #[test]
    fn trigger_event_round_trips() {
        let event = WorkflowTriggerEvent {
            run_id: "r1".to_string(),
            workflow_id: "w1".to_string(),
            payload: json!({"user_id": "u42"}),
        };
        let value = serde_json::to_value(&event).unwrap();
        let back: WorkflowTriggerEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }
}
