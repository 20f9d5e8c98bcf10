//! Remote collaborator traits
//!
//! The client-state core never talks HTTP directly; it consumes these two
//! traits. `vitrine-remote` provides the production implementations over the
//! storefront REST API, tests substitute in-process fakes.

use async_trait::async_trait;

use crate::settings::StoreSettings;
use crate::tenant::{Platform, TenantCode};
use crate::Result;

/// An authenticated administrator claim, as reported by the auth check
/// endpoint.
///
/// A claim binds the session to the admin's own platform; super-admins carry
/// the flag but no platform of their own unless one is also bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClaim {
    /// The platform this administrator manages, if bound to one
    pub platform: Option<TenantCode>,

    /// Whether the session belongs to a deployment-wide super admin
    pub is_super_admin: bool,
}

/// Session-bound authentication lookup (`GET /api/auth/check`).
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Fetch the admin claim for the current session.
    ///
    /// `Ok(None)` means no authenticated admin. Errors are transport
    /// failures; callers must treat them the same as `Ok(None)`.
    async fn admin_claim(&self) -> Result<Option<AdminClaim>>;
}

/// Read access to platform records and their settings documents.
#[async_trait]
pub trait PlatformDirectory: Send + Sync {
    /// Fetch the settings document for a platform
    /// (`GET /api/settings?platform={code}`). `Ok(None)` when no document
    /// exists yet.
    async fn settings(&self, code: &TenantCode) -> Result<Option<StoreSettings>>;

    /// Fetch a platform record (`GET /api/platforms/{code}`). `Ok(None)`
    /// when the platform is unknown.
    async fn platform(&self, code: &TenantCode) -> Result<Option<Platform>>;
}
