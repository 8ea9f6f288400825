//! # wfa-bus
//!
//! Durable publish/subscribe client (C5) for the trigger and completion
//! topics, protocol-agnostic at the trait boundary in spec.md §4.5 but
//! implemented here on Kafka via `rdkafka`, mirroring
//! `app/messaging/kafka.py`.

pub mod config;
pub mod consumer;
pub mod error;
pub mod events;
pub mod memory;
pub mod producer;

pub use config::BusConfig;
pub use consumer::KafkaConsumer;
pub use error::BusError;
pub use events::{WorkflowCompletedEvent, WorkflowTriggerEvent};
pub use memory::{InMemoryBus, InMemoryConsumer};
pub use producer::KafkaProducer;
