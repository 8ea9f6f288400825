//! Storage factory (C1): maps a `StorageType` tag to concrete backend
//! instances, mirroring `app/storage/factory.py` + `app/storage/enum.py`
//! (`StorageType.{FILE_SYSTEM,IN_MEMORY,POSTGRES}`) from the original
//! Python source. Each entity type gets its own storage instance, as the
//! original does.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use crate::error::StorageError;
use crate::file::{FileRunStorage, FileWorkflowStorage};
use crate::memory::{InMemoryRunStorage, InMemoryWorkflowStorage};
use crate::postgres::{self, PgRunStorage, PgWorkflowStorage};
use crate::traits::{RunStorage, WorkflowStorage};

pub type WorkflowStorageHandle = Arc<dyn WorkflowStorage>;
pub type RunStorageHandle = Arc<dyn RunStorage>;

/// Selects which concrete backend `StorageFactory` builds. Matches the
/// original `StorageType` enum's three variants one-for-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    FileSystem,
    Postgres,
}

impl StorageBackend {
    pub fn from_env_str(s: &str) -> Self {
        match s {
            "file_system" | "file" => StorageBackend::FileSystem,
            "postgres" | "postgresql" => StorageBackend::Postgres,
            _ => StorageBackend::InMemory,
        }
    }
}

pub struct StorageFactory;

impl StorageFactory {
    /// Build a `(WorkflowStorage, RunStorage)` pair for the requested
    /// backend. `data_dir` is only consulted for [`StorageBackend::FileSystem`];
    /// `pool` only for [`StorageBackend::Postgres`] (and is migrated first).
    pub async fn create(
        backend: StorageBackend,
        data_dir: Option<&PathBuf>,
        pool: Option<PgPool>,
    ) -> Result<(WorkflowStorageHandle, RunStorageHandle), StorageError> {
        match backend {
            StorageBackend::InMemory => Ok((
                Arc::new(InMemoryWorkflowStorage::new()),
                Arc::new(InMemoryRunStorage::new()),
            )),
            StorageBackend::FileSystem => {
                let root = data_dir
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from("./data"));
                Ok((
                    Arc::new(FileWorkflowStorage::new(&root).await?),
                    Arc::new(FileRunStorage::new(&root).await?),
                ))
            }
            StorageBackend::Postgres => {
                let pool = pool.ok_or_else(|| {
                    StorageError::Backend("postgres backend requires a PgPool".to_string())
                })?;
                postgres::run_migrations(&pool).await?;
                Ok((
                    Arc::new(PgWorkflowStorage::new(pool.clone())),
                    Arc::new(PgRunStorage::new(pool)),
                ))
            }
        }
    }
}
