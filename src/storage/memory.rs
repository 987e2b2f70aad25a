//! In-memory store
//!
//! Keeps every file as a byte vector keyed by its full name, next to an
//! explicit set of directories. Failures follow the local filesystem: files
//! need an existing parent directory, and directories open fine but fail on
//! the first read.

use super::{DirEntry, FileMeta, FileReader, FileStore, FileWriter, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::pin::Pin;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl Tree {
    fn parent_exists(&self, name: &str) -> bool {
        name.rsplit_once('/')
            .is_none_or(|(parent, _)| self.dirs.contains(parent))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tree: Arc<RwLock<Tree>>,
}

fn poisoned() -> io::Error {
    io::Error::other("memory store lock poisoned")
}

fn is_a_directory(name: &str) -> StoreError {
    StoreError::Io(io::Error::other(format!("'{name}' is a directory")))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the directory `name` and all of its ancestors
    pub fn create_dir(&self, name: &str) -> StoreResult<()> {
        let mut tree = self.write_tree()?;
        let mut end = 0;
        for segment in name.split('/') {
            end += segment.len();
            tree.dirs.insert(name[..end].to_string());
            end += 1;
        }
        Ok(())
    }

    fn read_tree(&self) -> StoreResult<RwLockReadGuard<'_, Tree>> {
        self.tree.read().map_err(|_| StoreError::Io(poisoned()))
    }

    fn write_tree(&self) -> StoreResult<RwLockWriteGuard<'_, Tree>> {
        self.tree.write().map_err(|_| StoreError::Io(poisoned()))
    }
}

/// Reader that yields `head` and then fails with `message`
pub(crate) struct BrokenReader {
    head: io::Cursor<Vec<u8>>,
    message: &'static str,
}

impl BrokenReader {
    pub(crate) const fn new(head: Vec<u8>, message: &'static str) -> Self {
        Self {
            head: io::Cursor::new(head),
            message,
        }
    }
}

impl AsyncRead for BrokenReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if this.head.position() < this.head.get_ref().len() as u64 {
            return Pin::new(&mut this.head).poll_read(cx, buf);
        }
        Poll::Ready(Err(io::Error::other(this.message)))
    }
}

/// Appends writes straight into the shared file entry
struct MemoryWriter {
    tree: Arc<RwLock<Tree>>,
    name: String,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let Ok(mut tree) = self.tree.write() else {
            return Poll::Ready(Err(poisoned()));
        };
        tree.files
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn open(&self, name: &str) -> StoreResult<FileReader> {
        let tree = self.read_tree()?;
        if let Some(data) = tree.files.get(name) {
            return Ok(Box::new(io::Cursor::new(data.clone())));
        }
        if tree.dirs.contains(name) {
            return Ok(Box::new(BrokenReader::new(Vec::new(), "is a directory")));
        }
        Err(StoreError::NotFound)
    }

    async fn create(&self, name: &str) -> StoreResult<FileWriter> {
        let mut tree = self.write_tree()?;
        if tree.dirs.contains(name) {
            return Err(is_a_directory(name));
        }
        if !tree.parent_exists(name) {
            return Err(StoreError::NotFound);
        }
        tree.files.insert(name.to_string(), Vec::new());

        Ok(Box::new(MemoryWriter {
            tree: Arc::clone(&self.tree),
            name: name.to_string(),
        }))
    }

    async fn stat(&self, name: &str) -> StoreResult<FileMeta> {
        let tree = self.read_tree()?;
        if let Some(data) = tree.files.get(name) {
            return Ok(FileMeta {
                size: data.len() as u64,
            });
        }
        if tree.dirs.contains(name) {
            return Ok(FileMeta { size: 0 });
        }
        Err(StoreError::NotFound)
    }

    async fn remove(&self, name: &str) -> StoreResult<()> {
        let mut tree = self.write_tree()?;
        if tree.files.remove(name).is_some() {
            return Ok(());
        }
        if tree.dirs.contains(name) {
            return Err(is_a_directory(name));
        }
        Err(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<DirEntry>> {
        let tree = self.read_tree()?;
        let mut top_level: BTreeMap<&str, FileMeta> = BTreeMap::new();

        for (name, data) in &tree.files {
            if !name.contains('/') {
                top_level.insert(
                    name.as_str(),
                    FileMeta {
                        size: data.len() as u64,
                    },
                );
            }
        }
        for dir in &tree.dirs {
            if !dir.contains('/') {
                top_level.insert(dir.as_str(), FileMeta { size: 0 });
            }
        }

        Ok(top_level
            .into_iter()
            .map(|(name, meta)| DirEntry {
                name: name.to_string(),
                meta: Ok(meta),
            })
            .collect())
    }
}
