//! Namespaced key/value storage trait
//!
//! The `KeyedStore` trait abstracts the client-side persistence layer used
//! for per-tenant carts and the global language preference. The store maps a
//! caller-supplied namespace string to a serialized blob; how the concrete
//! key (file name, browser storage key, ...) is computed from the namespace
//! is the implementation's business.

use async_trait::async_trait;

use crate::Result;

/// Namespaced persistent key/value store.
///
/// Implementations:
/// - `MemoryKeyedStore`: in-memory map, used by tests and as the degraded
///   mode when durable storage is unavailable
/// - `FileKeyedStore`: one atomically-written blob file per namespace
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Get the blob stored under a namespace, if any
    async fn get(&self, namespace: &str) -> Result<Option<Vec<u8>>>;

    /// Store a blob under a namespace, durably before returning
    async fn set(&self, namespace: &str, blob: Vec<u8>) -> Result<()>;

    /// Remove the blob stored under a namespace; absent namespaces are a no-op
    async fn remove(&self, namespace: &str) -> Result<()>;

    /// List known namespaces.
    ///
    /// Not required by the core (no cross-namespace operations exist), but
    /// useful for tooling. Implementations without enumeration support keep
    /// the default.
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
