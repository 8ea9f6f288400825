//! Error types for the connector registry and execution engine (C3, C4).

use thiserror::Error;
use wfa_storage::StorageError;
use wfa_types::WorkflowError;

/// Errors a connector can raise while executing a step. Surfaced to the
/// engine as spec.md §7's *connector-error* kind: the step is marked
/// FAILED with this message, which also becomes the run's `error`.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no connector registered for type: {0}")]
    UnknownConnectorType(String),
}

/// Errors the execution engine can raise. Storage failures bubble as
/// *backend-error* (spec.md §7): a run mid-execution transitions to
/// FAILED with the message rather than propagating a panic.
#[derive(Error, Debug)]
pub enum ExecutionEngineError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
