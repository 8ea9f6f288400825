//! Storage trait contracts (C1).
//!
//! A uniform CRUD + pagination contract, parameterised by entity type.
//! Traits are kept non-generic (one per entity) so they stay object-safe
//! and can be held as `Arc<dyn Trait>` in shared application state — the
//! same shape as the teacher's `WorkflowStorage` / `ExecutionStorage`
//! split, generalized here to also cover `delete`, `list_all` and
//! `list_paginated` per the specification's full storage contract.

use async_trait::async_trait;
use wfa_types::{WorkflowDefinition, WorkflowRun};

use crate::error::StorageError;

/// Page of items plus an optional cursor for the next page.
///
/// `next_cursor` is `Some(last_uuid)` iff more items remain beyond this
/// page; `None` means the caller has reached the end.
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait WorkflowStorage: Send + Sync {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowDefinition>, StorageError>;

    /// Assigns a fresh uuid to `item`, persists it, and returns the uuid.
    async fn create(&self, item: WorkflowDefinition) -> Result<String, StorageError>;

    /// Whole-record replacement. Returns `false` if no record with this
    /// uuid exists.
    async fn update(&self, item: WorkflowDefinition) -> Result<bool, StorageError>;

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError>;

    async fn list_all(&self) -> Result<Vec<WorkflowDefinition>, StorageError>;

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowDefinition>, StorageError>;
}

#[async_trait]
pub trait RunStorage: Send + Sync {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowRun>, StorageError>;

    async fn create(&self, item: WorkflowRun) -> Result<String, StorageError>;

    async fn update(&self, item: WorkflowRun) -> Result<bool, StorageError>;

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError>;

    async fn list_all(&self) -> Result<Vec<WorkflowRun>, StorageError>;

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowRun>, StorageError>;
}

/// Generate a fresh opaque uuid for a newly created record, in the same
/// hex-without-dashes shape as the Python original's `uuid.uuid4().hex`.
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Shared pagination slicing used by backends that only support
/// `list_all` efficiently (in-memory, file). Items are assumed already
/// sorted ascending by uuid.
pub fn paginate_slice<T: Clone>(
    mut items: Vec<T>,
    uuid_of: impl Fn(&T) -> String,
    limit: u32,
    cursor: Option<&str>,
) -> Page<T> {
    items.sort_by_key(|i| uuid_of(i));

    let start = match cursor {
        Some(c) => items
            .iter()
            .position(|i| uuid_of(i).as_str() > c)
            .unwrap_or(items.len()),
        None => 0,
    };

    let limit = limit as usize;
    let window: Vec<T> = items[start..].iter().take(limit + 1).cloned().collect();
    let has_more = window.len() > limit;
    let page_items: Vec<T> = if has_more {
        window[..limit].to_vec()
    } else {
        window
    };
    let next_cursor = if has_more {
        page_items.last().map(&uuid_of)
    } else {
        None
    };

    Page {
        items: page_items,
        next_cursor,
    }
}
