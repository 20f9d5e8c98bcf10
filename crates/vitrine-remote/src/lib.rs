//! Vitrine Remote Clients
//!
//! HTTP implementations of the core collaborator traits over the storefront
//! REST API:
//! - `AuthGateway` over `GET /api/auth/check`
//! - `PlatformDirectory` over `GET /api/settings` and `GET /api/platforms/{code}`

pub mod api;
pub mod client;

pub use api::{StorefrontApi, StorefrontApiConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

impl From<RemoteError> for vitrine_core::Error {
    fn from(e: RemoteError) -> Self {
        vitrine_core::Error::RemoteFetch(e.to_string())
    }
}
