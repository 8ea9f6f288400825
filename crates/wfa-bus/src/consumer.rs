//! Kafka consumer (C5), matching `app/messaging/kafka.py::KafkaConsumer`:
//! subscribes one topic under a named consumer group, earliest-offset
//! default, at-least-once delivery with no built-in dead-letter.

use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as _, StreamConsumer};
use rdkafka::message::Message;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{error, info, warn};

use crate::error::BusError;

/// Subscribed consumer over a single topic. Offsets are committed after
/// each message is handed to the handler, regardless of whether the
/// handler's own processing succeeded — malformed-message and
/// connector-level failures are the caller's concern (spec.md §4.7, §7);
/// the bus layer never blocks a partition on a single bad message.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaConsumer {
    pub fn new(bootstrap_servers: &str, group_id: &str, topic: &str) -> Result<Self, BusError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| BusError::Unavailable(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BusError::Unavailable(e.to_string()))?;

        info!(topic, group_id, "kafka consumer subscribed");
        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    /// Consumes until `shutdown` resolves, invoking `handler` once per
    /// message in arrival order within a partition. A message whose
    /// payload fails to deserialize as `T` is logged and skipped —
    /// poison-pill tolerance (spec.md §4.7 step 1) — without stalling the
    /// partition. Graceful shutdown: the in-flight handler call completes
    /// before the loop exits (spec.md §4.5).
    pub async fn consume<T, F, Fut>(&self, mut handler: F, shutdown: impl Future<Output = ()>)
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut stream = self.consumer.stream();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(topic = %self.topic, "consumer loop shutting down");
                    break;
                }
                next = stream.next() => {
                    match next {
                        Some(Ok(message)) => {
                            match message.payload().map(serde_json::from_slice::<T>) {
                                Some(Ok(value)) => handler(value).await,
                                Some(Err(e)) => warn!(error = %e, "poison message, skipping"),
                                None => warn!("message with no payload, skipping"),
                            }
                            if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                                error!(error = %e, "failed to commit offset");
                            }
                        }
                        Some(Err(e)) => error!(error = %e, "kafka stream error"),
                        None => break,
                    }
                }
            }
        }
    }
}
