//! `webhook` connector: makes an outbound HTTP call, matching
//! `app/connector/webhook.py::WebhookConnector.execute`.
//!
//! Placeholder substitution (`_replace_placeholders`) only resolves
//! top-level `${key}` references against `context` — per spec.md's Open
//! Questions, dotted paths like `${payload.user_id}` are left as
//! unresolved literals rather than guessed at.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use wfa_types::{Context, Step, StepOutput, WebhookConfig};

use crate::connector::Connector;
use crate::error::ConnectorError;

pub struct WebhookConnector {
    client: Client,
}

impl WebhookConnector {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build webhook HTTP client");
        Self { client }
    }

    fn replace_placeholders(value: &Value, context: &Context) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::replace_placeholders(v, context)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| Self::replace_placeholders(v, context))
                    .collect(),
            ),
            Value::String(s) => {
                if let Some(key) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
                    context.get(key).cloned().unwrap_or_else(|| value.clone())
                } else {
                    value.clone()
                }
            }
            other => other.clone(),
        }
    }
}

impl Default for WebhookConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for WebhookConnector {
    async fn execute(&self, step: &Step, context: &Context) -> Result<StepOutput, ConnectorError> {
        let Step::Webhook { config, .. } = step else {
            unreachable!("ConnectorRegistry only dispatches webhook steps to WebhookConnector")
        };
        let WebhookConfig {
            url,
            method,
            headers,
            body,
        } = config;

        let method = method.to_uppercase();
        let body = Self::replace_placeholders(body, context);

        debug!(%method, %url, "making webhook request");

        let mut builder = match method.as_str() {
            "GET" => self.client.get(url),
            "POST" => self.client.post(url).json(&body),
            "PUT" => self.client.put(url).json(&body),
            "DELETE" => self.client.delete(url),
            other => return Err(ConnectorError::UnsupportedMethod(other.to_string())),
        };

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status_code = response.status().as_u16();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let response_data = if content_type.starts_with("application/json") {
            match response.json::<Value>().await {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "webhook response claimed JSON but failed to parse");
                    Value::Null
                }
            }
        } else {
            Value::String(response.text().await.unwrap_or_default())
        };

        Ok(StepOutput::Webhook {
            status_code,
            response_data,
            url: url.clone(),
            method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn dotted_path_placeholder_is_left_as_unresolved_literal() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/echo")
                .json_body(json!({"u": "${payload.user_id}"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true}));
        });

        let connector = WebhookConnector::new();
        let step = Step::Webhook {
            name: "call".to_string(),
            config: WebhookConfig {
                url: server.url("/echo"),
                method: "POST".to_string(),
                headers: HashMap::new(),
                body: json!({"u": "${payload.user_id}"}),
            },
        };

        let context = wfa_types::initial_context(&json!({"user_id": "u42"}));
        let output = connector.execute(&step, &context).await.unwrap();
        mock.assert();
        match output {
            StepOutput::Webhook { status_code, .. } => assert_eq!(status_code, 200),
            _ => panic!("expected webhook output"),
        }
    }

    #[tokio::test]
    async fn top_level_placeholder_resolves_from_context() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/echo")
                .json_body(json!({"echoed": {"user_id": "u42"}}));
            then.status(200).json_body(json!({}));
        });

        let connector = WebhookConnector::new();
        let step = Step::Webhook {
            name: "call".to_string(),
            config: WebhookConfig {
                url: server.url("/echo"),
                method: "POST".to_string(),
                headers: HashMap::new(),
                body: json!({"echoed": "${payload}"}),
            },
        };

        let context = wfa_types::initial_context(&json!({"user_id": "u42"}));
        connector.execute(&step, &context).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn unsupported_method_errors() {
        let connector = WebhookConnector::new();
        let step = Step::Webhook {
            name: "call".to_string(),
            config: WebhookConfig {
                url: "http://example.invalid".to_string(),
                method: "PATCH".to_string(),
                headers: HashMap::new(),
                body: Value::Null,
            },
        };
        let context = wfa_types::initial_context(&json!({}));
        let err = connector.execute(&step, &context).await.unwrap_err();
        assert!(matches!(err, ConnectorError::UnsupportedMethod(_)));
    }
}
