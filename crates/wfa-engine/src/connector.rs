//! Connector registry (C3): resolves a step's `type` tag to an executable
//! unit, mirroring `ConnectorFactory.get_instance(step.type)` from
//! `app/connector/factory.py` and the `NodeExecutorRegistry` shape in the
//! teacher's `n8n-core::executor`. The registry is a closed set of two
//! entries per spec.md §4.3 — adding a third connector means extending
//! both `Step`/`StepOutput` in `wfa-types` and the match arm in
//! [`ConnectorRegistry::new`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use wfa_types::{Context, Step, StepOutput};

use crate::error::ConnectorError;

/// A single executable bound to a step type. `context` is read-only —
/// connectors observe prior steps' outputs but never write to it.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, step: &Step, context: &Context) -> Result<StepOutput, ConnectorError>;
}

/// Maps a connector tag (`Step::connector_type()`) to its `Arc<dyn Connector>`.
pub struct ConnectorRegistry {
    connectors: HashMap<&'static str, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        let mut connectors: HashMap<&'static str, Arc<dyn Connector>> = HashMap::new();
        connectors.insert("delay", Arc::new(crate::connectors::delay::DelayConnector));
        connectors.insert(
            "webhook",
            Arc::new(crate::connectors::webhook::WebhookConnector::new()),
        );
        Self { connectors }
    }

    pub fn get(&self, connector_type: &str) -> Result<Arc<dyn Connector>, ConnectorError> {
        self.connectors
            .get(connector_type)
            .cloned()
            .ok_or_else(|| ConnectorError::UnknownConnectorType(connector_type.to_string()))
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
