//! In-memory bus: ambient test tooling (spec.md §9's degenerate
//! single-process path needs something to exercise in unit tests without
//! a live broker). Not a C5 production backend — `KafkaProducer` /
//! `KafkaConsumer` are — but the same send/consume shape, so tests can
//! exercise the trigger → execute → completion flow end-to-end.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::BusError;

pub struct InMemoryBus {
    topics: Mutex<HashMap<String, mpsc::UnboundedSender<(Option<String>, Value)>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a queue for `topic`, returning the consuming half. Call
    /// this before any `send` whose messages should be observed — there
    /// is no backlog replay for a topic with no registered consumer.
    pub fn consumer(&self, topic: &str) -> InMemoryConsumer {
        let (tx, rx) = mpsc::unbounded_channel();
        self.topics.lock().unwrap().insert(topic.to_string(), tx);
        InMemoryConsumer {
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    pub async fn send<T: Serialize + Sync>(
        &self,
        topic: &str,
        value: &T,
        key: Option<&str>,
    ) -> Result<(), BusError> {
        let value =
            serde_json::to_value(value).map_err(|e| BusError::Serialization(e.to_string()))?;
        let tx = self.topics.lock().unwrap().get(topic).cloned();
        if let Some(tx) = tx {
            let _ = tx.send((key.map(str::to_string), value));
        }
        Ok(())
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryConsumer {
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<(Option<String>, Value)>>,
}

impl InMemoryConsumer {
    /// Same shape as [`crate::KafkaConsumer::consume`]: runs until
    /// `shutdown` resolves or the channel closes, handing each message's
    /// deserialized value to `handler`.
    pub async fn consume<T, F, Fut>(&self, mut handler: F, shutdown: impl Future<Output = ()>)
    where
        T: serde::de::DeserializeOwned,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut rx = self.rx.lock().await;
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                msg = rx.recv() => {
                    match msg {
                        Some((_key, value)) => match serde_json::from_value::<T>(value) {
                            Ok(v) => handler(v).await,
                            Err(e) => tracing::warn!(error = %e, "poison message, skipping"),
                        },
                        None => break,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn consumer_receives_messages_sent_after_registration() {
        let bus = InMemoryBus::new();
        let consumer = bus.consumer("t1");
        bus.send("t1", &json!({"n": 1}), Some("k1")).await.unwrap();
        bus.send("t1", &json!({"n": 2}), Some("k2")).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            consumer
                .consume::<Value, _, _>(
                    move |v| {
                        let tx = tx.clone();
                        async move {
                            let _ = tx.send(v);
                        }
                    },
                    tokio::time::sleep(std::time::Duration::from_millis(50)),
                )
                .await;
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first, json!({"n": 1}));
        assert_eq!(second, json!({"n": 2}));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn send_with_no_registered_consumer_is_a_silent_drop() {
        let bus = InMemoryBus::new();
        bus.send("nobody-listening", &json!({}), None).await.unwrap();
    }
}
