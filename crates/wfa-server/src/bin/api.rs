//! HTTP API binary: serves the REST surface in spec.md §6 and, in the
//! degenerate single-process deployment (spec.md §9), the worker loop
//! alongside it when `WFA_EMBED_WORKER=true`.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wfa_bus::KafkaConsumer;
use wfa_server::worker::Worker;
use wfa_server::{routes, AppState, Config};
use wfa_storage::StorageBackend;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wfa_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    info!(backend = ?config.storage_backend, "starting workflow-automation API");

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

    let app = routes::build_router(state.clone());

    let heartbeat_state = state.clone();
    let heartbeat_handle = tokio::spawn(async move {
        heartbeat_loop(heartbeat_state).await;
    });

    let embed_worker = std::env::var("WFA_EMBED_WORKER")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let worker_handle = if embed_worker {
        warn!("WFA_EMBED_WORKER set — running the consumer loop in the API process (degenerate deployment, spec.md §9)");
        let consumer = KafkaConsumer::new(
            &state.bus_config.bootstrap_servers,
            &state.bus_config.consumer_group,
            &state.bus_config.trigger_topic,
        )
        .expect("failed to subscribe embedded worker consumer");
        let worker = Arc::new(Worker::new(
            consumer,
            state.producer.clone(),
            state.engine.clone(),
            state.run_storage.clone(),
            state.bus_config.completed_topic.clone(),
        ));
        Some(tokio::spawn(async move {
            worker.run(shutdown_signal()).await;
        }))
    } else {
        None
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind to address");
    info!(%bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    heartbeat_handle.abort();
    if let Some(handle) = worker_handle {
        let _ = handle.await;
    }

    info!("api shutdown complete");
}

/// Ambient liveness signal: a periodic heartbeat timestamp written to the
/// cache under `health:last_tick` (spec.md §9's original `HealthStatus`
/// table, reimplemented on the existing cache layer — see DESIGN.md).
/// Failures are logged and never fatal; the `/health` endpoint itself
/// never depends on this loop.
async fn heartbeat_loop(state: AppState) {
    let Some(cache) = state.cache.clone() else {
        return;
    };
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        interval.tick().await;
        cache
            .set("health:last_tick", &chrono::Utc::now(), 120)
            .await;
    }
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
