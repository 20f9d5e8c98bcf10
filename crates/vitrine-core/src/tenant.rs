//! Tenant identity and platform records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::settings::Language;
use crate::{Error, Result};

/// Unique identifier for a tenant (a "platform" in storefront terms).
///
/// Codes are case-insensitive on the wire; they are normalized to lowercase
/// on construction so that `?platform=Roze` and an admin claim for `roze`
/// always refer to the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantCode(String);

impl TenantCode {
    /// Parse and normalize a tenant code.
    ///
    /// # Errors
    /// - `Error::InvalidTenant` if the code is empty, whitespace-only, or
    ///   contains characters other than ASCII alphanumerics, `-` and `_`.
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim().to_ascii_lowercase();
        if code.is_empty() {
            return Err(Error::InvalidTenant("empty tenant code".to_string()));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidTenant(format!(
                "tenant code contains invalid characters: {code:?}"
            )));
        }
        Ok(Self(code))
    }

    /// Get the normalized code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TenantCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<TenantCode> for String {
    fn from(code: TenantCode) -> Self {
        code.0
    }
}

/// A platform record as served by `GET /api/platforms/{code}`.
///
/// Read-only to the client-state core: platforms are created and mutated by
/// administrator tooling, the core only consumes them as a source of
/// defaults. `active = false` hides a platform from public resolution but
/// does not delete its data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    /// Unique, immutable platform code
    pub code: TenantCode,

    /// Display name
    pub name: String,

    /// Whether the platform is publicly reachable
    pub active: bool,

    /// Default storefront language, used when no settings document exists
    #[serde(rename = "language", default)]
    pub default_language: Language,

    /// Optional logo URL
    #[serde(rename = "logo", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}
