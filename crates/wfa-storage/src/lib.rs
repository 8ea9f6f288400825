//! # wfa-storage
//!
//! Storage abstraction (C1), backends, and the read-through cache (C2) for
//! the workflow-automation service. The trait contract in [`traits`] is
//! uniform across backends; only the relational backend
//! ([`postgres::PgWorkflowStorage`] / [`postgres::PgRunStorage`]) supports
//! efficient cursor pagination natively — [`memory`] and [`file`] fall back
//! to [`traits::paginate_slice`] over `list_all`.

pub mod cache;
pub mod error;
pub mod factory;
pub mod file;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use cache::Cache;
pub use error::StorageError;
pub use factory::{RunStorageHandle, StorageBackend, StorageFactory, WorkflowStorageHandle};
pub use traits::{generate_uuid, Page, RunStorage, WorkflowStorage};
