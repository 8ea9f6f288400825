//! Step definitions and the connector output union.
//!
//! A [`Step`] is a discriminated union over `type`, mirroring the
//! `Annotated[Union[...], Field(discriminator="type")]` shape of the
//! original Python schemas. The connector registry is a closed set of two
//! variants (`delay`, `webhook`) per the specification; adding a third
//! variant means extending both this enum and [`StepOutput`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the `delay` connector: sleep for `duration` seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelayConfig {
    pub duration: u64,
}

/// Configuration for the `webhook` connector: an outbound HTTP call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookConfig {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: serde_json::Value,
}

/// A single step in a workflow definition.
///
/// `name` must be unique within the enclosing workflow (validated at
/// workflow-create time, not here — see [`crate::WorkflowDefinition::validate`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    Delay { name: String, config: DelayConfig },
    Webhook { name: String, config: WebhookConfig },
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Step::Delay { name, .. } => name,
            Step::Webhook { name, .. } => name,
        }
    }

    pub fn connector_type(&self) -> &'static str {
        match self {
            Step::Delay { .. } => "delay",
            Step::Webhook { .. } => "webhook",
        }
    }
}

/// Output produced by a connector on successful execution, tagged by the
/// same discriminator as [`Step`] so a [`crate::StepResult`] can tell at a
/// glance which connector produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepOutput {
    Delay {
        duration: u64,
        message: String,
    },
    Webhook {
        status_code: u16,
        response_data: serde_json::Value,
        url: String,
        method: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_step_round_trips_through_json() {
        let step = Step::Delay {
            name: "s1".to_string(),
            config: DelayConfig { duration: 5 },
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "delay");
        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn webhook_config_defaults_headers_and_body() {
        let json = serde_json::json!({
            "name": "call",
            "type": "webhook",
            "config": {"url": "http://x", "method": "POST"}
        });
        let step: Step = serde_json::from_value(json).unwrap();
        match step {
            Step::Webhook { config, .. } => {
                assert!(config.headers.is_empty());
                assert!(config.body.is_null());
            }
            _ => panic!("expected webhook step"),
        }
    }

    #[test]
    fn step_name_and_connector_type() {
        let step = Step::Webhook {
            name: "call".to_string(),
            config: WebhookConfig {
                url: "http://x".to_string(),
                method: "GET".to_string(),
                headers: HashMap::new(),
                body: serde_json::Value::Null,
            },
        };
        assert_eq!(step.name(), "call");
        assert_eq!(step.connector_type(), "webhook");
    }
}
