//! Workflow definition type.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::WorkflowError;
use crate::step::Step;

/// Definition of a workflow: an ordered, non-empty sequence of steps.
///
/// Immutable after creation in this specification's scope — no versioning,
/// no update API. `uuid` is server-assigned at create time; `id` is an
/// optional user-supplied external identifier with no uniqueness
/// constraint (the two fields coexist with distinct, intentionally loose
/// semantics — see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub steps: Vec<Step>,
}

impl WorkflowDefinition {
    /// Validate structural invariants not covered by the storage layer:
    /// at least one step, and unique step names.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::InvalidWorkflow(
                "workflow must have at least one step".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                return Err(WorkflowError::DuplicateStepName(step.name().to_string()));
            }
        }

        Ok(())
    }

    pub fn get_step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::DelayConfig;

    fn delay(name: &str) -> Step {
        Step::Delay {
            name: name.to_string(),
            config: DelayConfig { duration: 1 },
        }
    }

    #[test]
    fn empty_steps_is_invalid() {
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![],
        };
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::InvalidWorkflow(_))
        ));
    }

    #[test]
    fn duplicate_step_names_are_invalid() {
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![delay("s1"), delay("s1")],
        };
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::DuplicateStepName(_))
        ));
    }

    #[test]
    fn valid_workflow_passes() {
        let wf = WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![delay("s1"), delay("s2")],
        };
        assert!(wf.validate().is_ok());
        assert!(wf.get_step("s2").is_some());
    }
}
