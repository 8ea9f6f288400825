//! Bus error types (C5).

use thiserror::Error;

/// Errors the bus client can raise. `Unavailable` is the *bus-unavailable*
/// kind from spec.md §7 — on trigger publish it fails the just-created
/// run; on completion publish it is logged and swallowed by the caller.
#[derive(Error, Debug, Clone)]
pub enum BusError {
    #[error("bus unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize message: {0}")]
    Serialization(String),
}
