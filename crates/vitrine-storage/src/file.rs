//! File-backed keyed store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use vitrine_core::keyed_store::KeyedStore;
use vitrine_core::{Error, Result};

use crate::atomic::write_atomic;

/// File-backed `KeyedStore`.
///
/// Each namespace maps to one blob file under the root directory. Writes go
/// through a temp file and an atomic rename, so a crash mid-write never
/// corrupts a previously persisted cart. Every `set` is durable before it
/// returns (write-through).
#[derive(Debug)]
pub struct FileKeyedStore {
    root: PathBuf,
}

impl FileKeyedStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// - `Error::Io` if the root directory cannot be created; callers fall
    ///   back to `MemoryKeyedStore` for the session.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "initialized file keyed store");
        Ok(Self { root })
    }

    fn blob_path(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(namespace)))
    }
}

/// Map a namespace to a safe file stem.
///
/// Namespaces are tenant codes or fixed preference keys, already lowercase
/// alphanumerics plus `-`/`_`; anything else is replaced so a namespace can
/// never escape the root directory.
fn sanitize(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl KeyedStore for FileKeyedStore {
    async fn get(&self, namespace: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(namespace);
        match tokio::fs::read(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn set(&self, namespace: &str, blob: Vec<u8>) -> Result<()> {
        let path = self.blob_path(namespace);
        tokio::task::spawn_blocking(move || write_atomic(&path, &blob))
            .await
            .map_err(|e| Error::Storage(format!("storage task failed: {e}")))??;
        Ok(())
    }

    async fn remove(&self, namespace: &str) -> Result<()> {
        let path = self.blob_path(namespace);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let mut namespaces = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                namespaces.push(stem.to_string());
            }
        }
        Ok(namespaces)
    }
}

impl FileKeyedStore {
    /// Root directory this store persists under
    pub fn root(&self) -> &Path {
        &self.root
    }
}
