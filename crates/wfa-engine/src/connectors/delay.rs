//! `delay` connector: sleeps for `config.duration` seconds, matching
//! `app/connector/delay.py::DelayConnector.execute`.

use async_trait::async_trait;
use tracing::debug;
use wfa_types::{Context, Step, StepOutput};

use crate::connector::Connector;
use crate::error::ConnectorError;

pub struct DelayConnector;

#[async_trait]
impl Connector for DelayConnector {
    async fn execute(&self, step: &Step, _context: &Context) -> Result<StepOutput, ConnectorError> {
        let Step::Delay { config, .. } = step else {
            unreachable!("ConnectorRegistry only dispatches delay steps to DelayConnector")
        };

        debug!(duration = config.duration, "delaying");
        tokio::time::sleep(std::time::Duration::from_secs(config.duration)).await;

        Ok(StepOutput::Delay {
            duration: config.duration,
            message: format!("Delayed for {} seconds", config.duration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wfa_types::DelayConfig;

    #[tokio::test]
    async fn delay_sleeps_and_reports_duration() {
        let connector = DelayConnector;
        let step = Step::Delay {
            name: "s1".to_string(),
            config: DelayConfig { duration: 0 },
        };
        let context = wfa_types::initial_context(&json!({}));

        let output = connector.execute(&step, &context).await.unwrap();
        match output {
            StepOutput::Delay { duration, message } => {
                assert_eq!(duration, 0);
                assert!(message.contains('0'));
            }
            _ => panic!("expected delay output"),
        }
    }
}
