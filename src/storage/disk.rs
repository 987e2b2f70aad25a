//! Local filesystem store
//!
//! Serves files from a single root directory using `tokio::fs`.

use super::{DirEntry, FileMeta, FileReader, FileStore, FileWriter, StoreError, StoreResult};
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if it is missing and return a store over it
    pub async fn open_root(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a resource name to a path under the root
    ///
    /// Names must be plain relative paths: no root, no `.`/`..` segments, no
    /// empty segments.
    fn resolve(&self, name: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(name);
        let valid = !name.is_empty()
            && !name.split('/').any(str::is_empty)
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name '{name}'"),
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn to_meta(metadata: &std::fs::Metadata) -> FileMeta {
    FileMeta {
        size: metadata.len(),
    }
}

#[async_trait]
impl FileStore for DiskStore {
    async fn open(&self, name: &str) -> StoreResult<FileReader> {
        let file = fs::File::open(self.resolve(name)?).await?;
        Ok(Box::new(file))
    }

    async fn create(&self, name: &str) -> StoreResult<FileWriter> {
        let file = fs::File::create(self.resolve(name)?).await?;
        Ok(Box::new(file))
    }

    async fn stat(&self, name: &str) -> StoreResult<FileMeta> {
        let metadata = fs::metadata(self.resolve(name)?).await?;
        Ok(to_meta(&metadata))
    }

    async fn remove(&self, name: &str) -> StoreResult<()> {
        fs::remove_file(self.resolve(name)?).await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<DirEntry>> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry
                .metadata()
                .await
                .map(|m| to_meta(&m))
                .map_err(StoreError::from);
            entries.push(DirEntry { name, meta });
        }

        // read_dir order is platform dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
