//! Kafka worker binary (C7): the canonical out-of-process deployment from
//! spec.md §9 — consumes `workflow.trigger`, drives the execution engine,
//! publishes `workflow.completed`.

use std::sync::Arc;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wfa_bus::KafkaConsumer;
use wfa_server::worker::Worker;
use wfa_server::{AppState, Config};
use wfa_storage::StorageBackend;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wfa_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!(backend = ?config.storage_backend, "starting workflow worker");

    let pool = match config.storage_backend {
        StorageBackend::Postgres => Some(
            sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(&config.postgres_url())
                .await
                .expect("failed to connect to postgres"),
        ),
        _ => None,
    };

    let data_dir = std::path::PathBuf::from(&config.data_dir);
    let (workflow_storage, run_storage) =
        wfa_storage::StorageFactory::create(config.storage_backend, Some(&data_dir), pool)
            .await
            .expect("failed to initialize storage backend");

    let state = AppState::new(&config, workflow_storage, run_storage).await;

    let consumer = KafkaConsumer::new(
        &state.bus_config.bootstrap_servers,
        &state.bus_config.consumer_group,
        &state.bus_config.trigger_topic,
    )
    .expect("failed to subscribe consumer");

    let worker = Arc::new(Worker::new(
        consumer,
        state.producer.clone(),
        state.engine.clone(),
        state.run_storage.clone(),
        state.bus_config.completed_topic.clone(),
    ));

    worker.run(shutdown_signal()).await;

    info!("workflow worker shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
