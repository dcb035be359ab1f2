//! In-memory storage implementation.

use super::{ProjectStore, StorageError, StorageResult, sort_newest_first};
use crate::BoxFuture;
use crate::project::ProjectRecord;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    projects: RwLock<HashMap<String, ProjectRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl ProjectStore for MemoryStorage {
    fn save(&self, record: &ProjectRecord) -> BoxFuture<'_, StorageResult<()>> {
        let record = record.clone();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.insert(record.id.clone(), record);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            projects
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectRecord>>> {
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            let mut records: Vec<_> = projects.values().cloned().collect();
            sort_newest_first(&mut records);
            Ok(records)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            Ok(projects.contains_key(&id))
        })
    }
}
