//! In-memory keyed store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use vitrine_core::keyed_store::KeyedStore;
use vitrine_core::Result;

/// In-memory `KeyedStore`.
///
/// Holds blobs for the lifetime of the process only. Used by tests and as
/// the degraded mode when durable storage is blocked (private browsing
/// equivalent): the session keeps working, nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyedStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyedStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyedStore for MemoryKeyedStore {
    async fn get(&self, namespace: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(namespace).cloned())
    }

    async fn set(&self, namespace: &str, blob: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let _ = entries.insert(namespace.to_string(), blob);
        Ok(())
    }

    async fn remove(&self, namespace: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let _ = entries.remove(namespace);
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.keys().cloned().collect())
    }
}
