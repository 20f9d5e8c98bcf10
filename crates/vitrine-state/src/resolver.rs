//! Tenant resolution from navigation state

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use vitrine_core::gateway::AuthGateway;
use vitrine_core::tenant::TenantCode;

/// Query parameter carrying the tenant code on public pages
const PLATFORM_PARAM: &str = "platform";

/// The navigational inputs of one page activation.
///
/// Resolution reads explicit inputs instead of ambient URL state so the
/// precedence rules are testable with literal values.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    params: HashMap<String, String>,
}

impl Navigation {
    /// A navigation with no query parameters (public landing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded query pairs
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The raw `platform` query parameter, if present
    pub fn platform_param(&self) -> Option<&str> {
        self.params.get(PLATFORM_PARAM).map(String::as_str)
    }
}

/// Resolves the active tenant for a navigation event.
///
/// Precedence, first match wins:
/// 1. an authenticated admin claim bound to a tenant (always wins, the URL
///    cannot steer an admin onto another platform's data)
/// 2. a non-empty `platform` query parameter
/// 3. `None` — the tenant-less landing state
///
/// Resolution is attempted fresh on every navigation; a `None` outcome is a
/// valid result, never a signal to keep a previously resolved tenant.
pub struct TenantResolver {
    auth: Arc<dyn AuthGateway>,
}

impl TenantResolver {
    /// Create a resolver backed by the given auth gateway
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self { auth }
    }

    /// Resolve the active tenant for one navigation
    pub async fn resolve(&self, nav: &Navigation) -> Option<TenantCode> {
        // Claim lookup failure is non-fatal: the session simply resolves
        // like an unauthenticated one.
        match self.auth.admin_claim().await {
            Ok(Some(claim)) => {
                if let Some(code) = claim.platform {
                    debug!(tenant = %code, "resolved tenant from admin claim");
                    return Some(code);
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "admin claim lookup failed, resolving as public"),
        }

        match nav.platform_param() {
            Some(raw) => match TenantCode::new(raw) {
                Ok(code) => {
                    debug!(tenant = %code, "resolved tenant from query parameter");
                    Some(code)
                }
                Err(e) => {
                    warn!(param = raw, error = %e, "unusable platform parameter");
                    None
                }
            },
            None => None,
        }
    }
}
