//! Bus configuration loaded from environment (spec.md §6).

use std::env;

#[derive(Debug, Clone)]
pub struct BusConfig {
    pub bootstrap_servers: String,
    pub consumer_group: String,
    pub trigger_topic: String,
    pub completed_topic: String,
}

impl BusConfig {
    pub fn from_env() -> Self {
        Self {
            bootstrap_servers: env::var("KAFKA_BOOTSTRAP_SERVERS")
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            consumer_group: env::var("KAFKA_CONSUMER_GROUP")
                .unwrap_or_else(|_| "workflow-workers".to_string()),
            trigger_topic: env::var("KAFKA_TOPIC_WORKFLOW_TRIGGER")
                .unwrap_or_else(|_| "workflow.trigger".to_string()),
            completed_topic: env::var("KAFKA_TOPIC_WORKFLOW_COMPLETED")
                .unwrap_or_else(|_| "workflow.completed".to_string()),
        }
    }
}
