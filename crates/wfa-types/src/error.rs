//! Error types shared by the workflow data model.

use thiserror::Error;

/// Errors that can arise while constructing or validating workflow data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("step not found: {0}")]
    StepNotFound(String),

    #[error("duplicate step name: {0}")]
    DuplicateStepName(String),
}
