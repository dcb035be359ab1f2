//! Project persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::BoxFuture;
use crate::project::ProjectRecord;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend that saves and restores projects by id.
///
/// Native implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait ProjectStore: Send + Sync {
    fn save(&self, record: &ProjectRecord) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectRecord>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// All stored projects, most recently updated first.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectRecord>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(target_arch = "wasm32")]
pub trait ProjectStore {
    fn save(&self, record: &ProjectRecord) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectRecord>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectRecord>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

fn sort_newest_first(records: &mut [ProjectRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
