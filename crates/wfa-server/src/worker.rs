//! Worker loop (C7): consumes the trigger topic under group
//! `workflow-workers`, drives each run through the execution engine (C4),
//! and publishes a completion event — spec.md §4.7, matching
//! `app/worker/main.py::WorkflowWorker`.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use wfa_bus::{KafkaConsumer, KafkaProducer, WorkflowCompletedEvent, WorkflowTriggerEvent};
use wfa_engine::ExecutionEngine;
use wfa_storage::RunStorageHandle;
use wfa_types::WorkflowStatus;

pub struct Worker {
    consumer: KafkaConsumer,
    producer: Arc<KafkaProducer>,
    engine: Arc<ExecutionEngine>,
    run_storage: RunStorageHandle,
    completed_topic: String,
}

impl Worker {
    pub fn new(
        consumer: KafkaConsumer,
        producer: Arc<KafkaProducer>,
        engine: Arc<ExecutionEngine>,
        run_storage: RunStorageHandle,
        completed_topic: String,
    ) -> Self {
        Self {
            consumer,
            producer,
            engine,
            run_storage,
            completed_topic,
        }
    }

    /// Runs until `shutdown` resolves. The in-flight run (if any) is
    /// allowed to finish before the loop exits — cancellation never
    /// interrupts a run mid-step (spec.md §4.7, §5).
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        info!("workflow worker started, waiting for messages");
        self.producer.start().await.ok();

        self.consumer
            .consume::<WorkflowTriggerEvent, _, _>(
                |event| async move { self.handle_message(event).await },
                shutdown,
            )
            .await;

        self.producer.stop().await;
        info!("workflow worker stopped");
    }

    async fn handle_message(&self, event: WorkflowTriggerEvent) {
        info!(run_id = %event.run_id, "processing workflow trigger");

        if let Err(e) = self.engine.execute_run(&event.run_id).await {
            error!(run_id = %event.run_id, error = %e, "engine returned an error executing run");
        }

        let (status, error) = match self.run_storage.get(&event.run_id).await {
            Ok(Some(run)) => (run.status, run.error),
            Ok(None) => (WorkflowStatus::Failed, Some("Run not found".to_string())),
            Err(e) => (WorkflowStatus::Failed, Some(e.to_string())),
        };

        let completed_event = WorkflowCompletedEvent {
            run_id: event.run_id.clone(),
            workflow_id: event.workflow_id.clone(),
            status,
            error: if matches!(status, WorkflowStatus::Failed) {
                error
            } else {
                None
            },
        };

        if let Err(e) = self
            .producer
            .send(&self.completed_topic, &completed_event, Some(&event.run_id))
            .await
        {
            // Advisory only — storage is the authoritative terminal state
            // (spec.md §4.7 step 5).
            error!(run_id = %event.run_id, error = %e, "failed to publish completion event");
        } else {
            info!(run_id = %event.run_id, status = ?status, "workflow completed");
        }
    }
}
