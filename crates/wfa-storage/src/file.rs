//! File storage backend: one JSON file per uuid under a per-type
//! directory. Writes are atomic (write-temp + rename); there are no
//! cross-record transactions, matching spec.md §4.1's file backend row.
//!
//! Layout mirrors spec.md §6: `<data>/workflowdefinitions/<uuid>.json`,
//! `<data>/workflowruns/<uuid>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use wfa_types::{WorkflowDefinition, WorkflowRun};

use crate::error::StorageError;
use crate::traits::{generate_uuid, paginate_slice, Page, RunStorage, WorkflowStorage};

/// Write `contents` to `path` atomically: write to a sibling `.tmp` file
/// then rename over the destination. Renames within the same directory are
/// atomic on POSIX filesystems, so a crash mid-write never leaves a
/// partially-written record observable.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

async fn read_dir_uuids(dir: &Path) -> Result<Vec<String>, StorageError> {
    let mut uuids = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(uuids),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                uuids.push(stem.to_string());
            }
        }
    }
    Ok(uuids)
}

/// `FileWorkflowStorage` persists each [`WorkflowDefinition`] as
/// `<root>/workflowdefinitions/<uuid>.json`.
#[derive(Clone)]
pub struct FileWorkflowStorage {
    dir: PathBuf,
}

impl FileWorkflowStorage {
    pub async fn new(data_root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = data_root.as_ref().join("workflowdefinitions");
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, uuid: &str) -> PathBuf {
        self.dir.join(format!("{uuid}.json"))
    }
}

#[async_trait]
impl WorkflowStorage for FileWorkflowStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowDefinition>, StorageError> {
        match fs::read(self.path_for(uuid)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, mut item: WorkflowDefinition) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        let bytes = serde_json::to_vec_pretty(&item)?;
        write_atomic(&self.path_for(&uuid), &bytes).await?;
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowDefinition) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        if self.get(&uuid).await?.is_none() {
            return Ok(false);
        }
        let bytes = serde_json::to_vec_pretty(&item)?;
        write_atomic(&self.path_for(&uuid), &bytes).await?;
        Ok(true)
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(uuid)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<WorkflowDefinition>, StorageError> {
        let mut items = Vec::new();
        for uuid in read_dir_uuids(&self.dir).await? {
            if let Some(item) = self.get(&uuid).await? {
                items.push(item);
            }
        }
        Ok(items)
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

/// `FileRunStorage` persists each [`WorkflowRun`] as
/// `<root>/workflowruns/<uuid>.json`.
#[derive(Clone)]
pub struct FileRunStorage {
    dir: PathBuf,
}

impl FileRunStorage {
    pub async fn new(data_root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = data_root.as_ref().join("workflowruns");
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, uuid: &str) -> PathBuf {
        self.dir.join(format!("{uuid}.json"))
    }
}

#[async_trait]
impl RunStorage for FileRunStorage {
    async fn get(&self, uuid: &str) -> Result<Option<WorkflowRun>, StorageError> {
        match fs::read(self.path_for(uuid)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, mut item: WorkflowRun) -> Result<String, StorageError> {
        let uuid = generate_uuid();
        item.uuid = Some(uuid.clone());
        let bytes = serde_json::to_vec_pretty(&item)?;
        write_atomic(&self.path_for(&uuid), &bytes).await?;
        Ok(uuid)
    }

    async fn update(&self, item: WorkflowRun) -> Result<bool, StorageError> {
        let Some(uuid) = item.uuid.clone() else {
            return Ok(false);
        };
        if self.get(&uuid).await?.is_none() {
            return Ok(false);
        }
        let bytes = serde_json::to_vec_pretty(&item)?;
        write_atomic(&self.path_for(&uuid), &bytes).await?;
        Ok(true)
    }

    async fn delete(&self, uuid: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(uuid)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<WorkflowRun>, StorageError> {
        let mut items = Vec::new();
        for uuid in read_dir_uuids(&self.dir).await? {
            if let Some(item) = self.get(&uuid).await? {
                items.push(item);
            }
        }
        Ok(items)
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
    use wfa_types::{DelayConfig, Step};

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            uuid: None,
            id: None,
            name: "w".to_string(),
            description: None,
            steps: vec![Step::Delay {
                name: "s1".to_string(),
                config: DelayConfig { duration: 1 },
            }],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileWorkflowStorage::new(dir.path()).await.unwrap();
        let uuid = storage.create(workflow()).await.unwrap();
        let loaded = storage.get(&uuid).await.unwrap().unwrap();
        assert_eq!(loaded.uuid.as_deref(), Some(uuid.as_str()));
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileRunStorage::new(dir.path()).await.unwrap();
        assert!(!storage.delete("missing").await.unwrap());
    }

    #[tokio::test]
    async fn update_missing_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileWorkflowStorage::new(dir.path()).await.unwrap();
        let mut wf = workflow();
        wf.uuid = Some("does-not-exist".to_string());
        assert!(!storage.update(wf).await.unwrap());
    }

    #[tokio::test]
    async fn list_all_survives_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileRunStorage::new(dir.path().join("nested")).await.unwrap();
        assert!(storage.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pagination_matches_in_memory_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileRunStorage::new(dir.path()).await.unwrap();
        for _ in 0..5 {
            let run = WorkflowRun::new_pending("wf-1", json!({}));
            storage.create(run).await.unwrap();
        }
        let page = storage.list_paginated(3, None).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.next_cursor.is_some());
        let page2 = storage
            .list_paginated(3, page.next_cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(page2.items.len(), 2);
        assert!(page2.next_cursor.is_none());
    }
}
