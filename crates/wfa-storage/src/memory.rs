//! In-memory storage backend: lost on restart, mutex-guarded map, single
//! process only. Used for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use wfa_types::{WorkflowDefinition, WorkflowRun};

use crate::error::StorageError;
use crate::traits::{generate_uuid, paginate_slice, Page, RunStorage, WorkflowStorage};

#[derive(Clone, Default)]
pub struct InMemoryWorkflowStorage {
    inner: Arc<Mutex<HashMap<String, WorkflowDefinition>>>,
}

impl InMemoryWorkflowStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStorage for InMemoryWorkflowStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowDefinition>, StorageError> {
        Ok(self.inner.lock().await.get(uuid).cloned())
    }

    async fn create(&self, mut item: WorkflowDefinition) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        self.inner.lock().await.insert(uuid.clone(), item);
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowDefinition) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        let mut guard = self.inner.lock().await;
        if guard.contains_key(&uuid) {
            guard.insert(uuid, item);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.remove(uuid).is_some())
    }

    async fn list_all(&self) -> Result<Vec<WorkflowDefinition>, StorageError> {
        Ok(self.inner.lock().await.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowDefinition>, StorageError> {
        let items = self.list_all().await?;
        Ok(paginate_slice(
            items,
            |w| w.uuid.clone().unwrap_or_default(),
            limit,
            cursor,
        ))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRunStorage {
    inner: Arc<Mutex<HashMap<String, WorkflowRun>>>,
}

impl InMemoryRunStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStorage for InMemoryRunStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowRun>, StorageError> {
        Ok(self.inner.lock().await.get(uuid).cloned())
    }

    async fn create(&self, mut item: WorkflowRun) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        self.inner.lock().await.insert(uuid.clone(), item);
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowRun) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        let mut guard = self.inner.lock().await;
        if guard.contains_key(&uuid) {
            guard.insert(uuid, item);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.remove(uuid).is_some())
    }

    async fn list_all(&self) -> Result<Vec<WorkflowRun>, StorageError> {
        Ok(self.inner.lock().await.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<WorkflowRun>, StorageError> {
        let items = self.list_all().await?;
        Ok(paginate_slice(
            items,
            |r| r.uuid.clone().unwrap_or_default(),
            limit,
            cursor,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![wfa_types::Step::Delay {
                name: "s1".to_string(),
                config: wfa_types::DelayConfig { duration: 1 },
            }],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let storage = InMemoryWorkflowStorage::new();
        let uuid = storage.create(workflow()).await.unwrap();
        let loaded = storage.get(&uuid).await.unwrap().unwrap();
        assert_eq!(loaded.uuid.as_deref(), Some(uuid.as_str()));
        assert_eq!(loaded.name, "w");
    }

    #[tokio::test]
    async fn update_missing_returns_false() {
        let storage = InMemoryWorkflowStorage::new();
        let mut wf = workflow();
        wf.uuid = Some("does-not-exist".to_string());
        assert!(!storage.update(wf).await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let storage = InMemoryRunStorage::new();
        assert!(!storage.delete("missing").await.unwrap());
    }

    #[tokio::test]
    async fn pagination_yields_every_item_exactly_once_in_order() {
        let storage = InMemoryRunStorage::new();
        for _ in 0..125 {
            let run = WorkflowRun::new_pending("wf-1", json!({}));
            storage.create(run).await.unwrap();
        }

        let mut pages = Vec::new();
        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = storage
                .list_paginated(50, cursor.as_deref())
                .await
                .unwrap();
            pages.push(page.items.len());
            seen.extend(page.items.into_iter().map(|r| r.uuid.unwrap()));
            match page.next_cursor {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        assert_eq!(pages, vec![50, 50, 25]);
        assert_eq!(seen.len(), 125);
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(seen, sorted);
    }
}
