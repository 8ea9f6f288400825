//! # wfa-engine
//!
//! The connector registry (C3) and execution engine (C4) that drive a
//! triggered workflow run to completion. Depends only on `wfa-types` for
//! the data model and `wfa-storage` for persistence — no knowledge of the
//! trigger ingress, the message bus, or the HTTP surface lives here.

pub mod connector;
pub mod connectors;
pub mod engine;
pub mod error;

pub use connector::{Connector, ConnectorRegistry};
pub use engine::ExecutionEngine;
pub use error::{ConnectorError, ExecutionEngineError};
