//! Vitrine Storage
//!
//! `KeyedStore` implementations backing the per-tenant cart and preference
//! persistence:
//! - `MemoryKeyedStore`: in-memory, for tests and degraded (storage
//!   unavailable) sessions
//! - `FileKeyedStore`: one atomically-written blob file per namespace

mod atomic;
pub mod file;
pub mod memory;

pub use file::FileKeyedStore;
pub use memory::MemoryKeyedStore;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use vitrine_core::keyed_store::KeyedStore;

/// Open a file-backed store rooted at `root`, degrading to an in-memory
/// store when durable storage is blocked (the private-browsing case).
///
/// The degradation is silent: the session keeps a fully working cart, it
/// just won't survive a restart.
pub fn durable_or_memory(root: impl Into<PathBuf>) -> Arc<dyn KeyedStore> {
    let root = root.into();
    match FileKeyedStore::new(&root) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(root = %root.display(), error = %e, "durable storage unavailable, using memory");
            Arc::new(MemoryKeyedStore::new())
        }
    }
}
