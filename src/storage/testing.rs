//! Store that fails on demand, for exercising the error branches of the handlers.

use super::{
    DirEntry, FileMeta, FileReader, FileStore, FileWriter, MemoryStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::io;
use tokio::io::AsyncReadExt;

pub(crate) use super::memory::BrokenReader;

fn denied() -> StoreError {
    StoreError::Io(io::Error::from(io::ErrorKind::PermissionDenied))
}

/// Wraps a [`MemoryStore`] and fails the selected operations with
/// `PermissionDenied`
#[derive(Debug, Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_open: bool,
    /// Open succeeds but the reader fails after half of the file
    pub fail_read: bool,
    pub fail_create: bool,
    pub fail_stat: bool,
    pub fail_remove: bool,
    pub fail_list: bool,
    /// Entries whose metadata cannot be read during listing
    pub unreadable: Vec<String>,
}

#[async_trait]
impl FileStore for FailingStore {
    async fn open(&self, name: &str) -> StoreResult<FileReader> {
        if self.fail_open {
            return Err(denied());
        }
        let mut reader = self.inner.open(name).await?;
        if !self.fail_read {
            return Ok(reader);
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        data.truncate(data.len() / 2);
        Ok(Box::new(BrokenReader::new(data, "read failed midway")))
    }

    async fn create(&self, name: &str) -> StoreResult<FileWriter> {
        if self.fail_create {
            return Err(denied());
        }
        self.inner.create(name).await
    }

    async fn stat(&self, name: &str) -> StoreResult<FileMeta> {
        if self.fail_stat {
            return Err(denied());
        }
        self.inner.stat(name).await
    }

    async fn remove(&self, name: &str) -> StoreResult<()> {
        if self.fail_remove {
            return Err(denied());
        }
        self.inner.remove(name).await
    }

    async fn list(&self) -> StoreResult<Vec<DirEntry>> {
        if self.fail_list {
            return Err(denied());
        }
        let mut entries = self.inner.list().await?;
        for entry in &mut entries {
            if self.unreadable.contains(&entry.name) {
                entry.meta = Err(denied());
            }
        }
        Ok(entries)
    }
}
