//! Error types for Vitrine Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
