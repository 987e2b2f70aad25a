//! Storage module
//!
//! Abstracts the storage root behind the [`FileStore`] capability so the
//! request handlers behave the same against the local filesystem and the
//! in-memory store.

mod disk;
mod memory;

#[cfg(test)]
pub mod testing;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte stream returned by [`FileStore::open`]
pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// Byte sink returned by [`FileStore::create`]
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation failure
///
/// Only two outcomes matter to the HTTP layer: the file is missing, or
/// something else went wrong.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file does not exist")]
    NotFound,
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }
}

/// Metadata reported by [`FileStore::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Size in bytes
    pub size: u64,
}

/// One direct child of the storage root
///
/// Metadata is resolved per entry so a single unreadable entry does not fail
/// the whole enumeration.
#[derive(Debug)]
pub struct DirEntry {
    pub name: String,
    pub meta: StoreResult<FileMeta>,
}

/// Filesystem capability backing the storage root
///
/// Names are relative, `/`-separated paths inside the root.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Open an existing file for reading
    async fn open(&self, name: &str) -> StoreResult<FileReader>;

    /// Create a file, truncating it if it already exists
    async fn create(&self, name: &str) -> StoreResult<FileWriter>;

    async fn stat(&self, name: &str) -> StoreResult<FileMeta>;

    async fn remove(&self, name: &str) -> StoreResult<()>;

    /// Enumerate the direct children of the root (non-recursive)
    async fn list(&self) -> StoreResult<Vec<DirEntry>>;
}
