//! Process-scoped resources (singletons): storage, cache, producer and
//! engine handles created once at startup and shared across request
//! handlers and the worker loop, per spec.md §9's "no implicit global
//! initialization at import time" design note.

use std::sync::Arc;

use wfa_bus::{BusConfig, KafkaProducer};
use wfa_engine::ExecutionEngine;
use wfa_storage::{Cache, RunStorageHandle, WorkflowStorageHandle};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub workflow_storage: WorkflowStorageHandle,
    pub run_storage: RunStorageHandle,
    pub cache: Option<Arc<Cache>>,
    pub producer: Arc<KafkaProducer>,
    pub engine: Arc<ExecutionEngine>,
    pub bus_config: BusConfig,
    pub default_page_limit: u32,
}

impl AppState {
    pub async fn new(
        config: &Config,
        workflow_storage: WorkflowStorageHandle,
        run_storage: RunStorageHandle,
    ) -> Self {
        let cache = match Cache::connect(&config.redis_url()).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!(error = %e, "cache unavailable at startup, reads will hit storage directly");
                None
            }
        };

        let bus_config = BusConfig::from_env();
        let producer = Arc::new(KafkaProducer::new(bus_config.bootstrap_servers.clone()));

        let engine = Arc::new(ExecutionEngine::new(
            workflow_storage.clone(),
            run_storage.clone(),
            Arc::new(wfa_engine::ConnectorRegistry::new()),
        ));

        Self {
            workflow_storage,
            run_storage,
            cache,
            producer,
            engine,
            bus_config,
            default_page_limit: config.default_page_limit,
        }
    }
}
