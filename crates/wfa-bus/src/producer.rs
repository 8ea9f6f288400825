//! Kafka producer (C5), matching `app/messaging/kafka.py::KafkaProducer`:
//! idempotent, lock-serialized `start()`, `acks=all` durability, 10ms
//! linger / 32KiB batch — the backpressure signal the trigger endpoint
//! relies on per spec.md §5.

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::BusError;

/// Durable publisher. Cheap to clone and share — the inner `FutureProducer`
/// is itself a handle around a librdkafka client.
pub struct KafkaProducer {
    bootstrap_servers: String,
    inner: Mutex<Option<FutureProducer>>,
}

impl KafkaProducer {
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            inner: Mutex::new(None),
        }
    }

    /// Idempotent: concurrent callers racing `start()` see a single
    /// initialization, serialized by the mutex (spec.md §4.5).
    pub async fn start(&self) -> Result<(), BusError> {
        let mut guard = self.inner.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("message.timeout.ms", "30000")
            .set("acks", "all")
            .set("linger.ms", "10")
            .set("batch.size", "32768")
            .create()
            .map_err(|e| BusError::Unavailable(e.to_string()))?;
        info!(bootstrap_servers = %self.bootstrap_servers, "kafka producer started");
        *guard = Some(producer);
        Ok(())
    }

    /// Flushes in-flight sends and releases the client.
    pub async fn stop(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(producer) = guard.take() {
            let _ = producer.flush(Duration::from_secs(10));
            info!("kafka producer stopped");
        }
    }

    /// Serializes `value` as JSON and sends to `topic`, returning once the
    /// broker confirms durability. Lazily starts the producer on first use,
    /// matching the original's `if self._producer is None: await start()`.
    pub async fn send<T: Serialize + Sync>(
        &self,
        topic: &str,
        value: &T,
        key: Option<&str>,
    ) -> Result<(), BusError> {
        let producer = match self.inner.lock().await.clone() {
            Some(p) => p,
            None => {
                self.start().await?;
                self.inner
                    .lock()
                    .await
                    .clone()
                    .expect("producer initialized by start()")
            }
        };

        let payload =
            serde_json::to_vec(value).map_err(|e| BusError::Serialization(e.to_string()))?;
        let mut record = FutureRecord::to(topic).payload(&payload);
        if let Some(k) = key {
            record = record.key(k);
        }

        producer
            .send(record, Duration::from_secs(10))
            .await
            .map_err(|(e, _)| BusError::Unavailable(e.to_string()))?;

        Ok(())
    }
}
