//! Navigation-driven coordination of resolver, cascade and cart

use std::sync::Arc;
use tracing::debug;

use vitrine_core::gateway::{AuthGateway, PlatformDirectory};
use vitrine_core::keyed_store::KeyedStore;
use vitrine_core::settings::{EffectiveSettings, Language};
use vitrine_core::tenant::TenantCode;

use crate::cart::TenantCartStore;
use crate::resolver::{Navigation, TenantResolver};
use crate::settings::SettingsCascade;

/// The resolved view of one navigation
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Active tenant, or `None` for the tenant-less landing state
    pub tenant: Option<TenantCode>,

    /// Effective display settings for this activation
    pub settings: EffectiveSettings,
}

/// One browser session's view of the storefront.
///
/// Runs the activation pipeline on every navigation: resolve the tenant,
/// resolve its effective settings, swap the cart. Re-entrant and idempotent;
/// navigating to the same tenant twice is harmless.
pub struct Storefront {
    resolver: TenantResolver,
    cascade: SettingsCascade,
    cart: TenantCartStore,
}

impl Storefront {
    /// Wire a storefront session from its collaborators.
    ///
    /// `prefs` holds the browser-global language preference; `carts` holds
    /// one namespace per tenant the browser has ever visited. Keeping the
    /// two stores separate means a cart namespace can never collide with a
    /// preference key.
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        directory: Arc<dyn PlatformDirectory>,
        prefs: Arc<dyn KeyedStore>,
        carts: Arc<dyn KeyedStore>,
    ) -> Self {
        Self {
            resolver: TenantResolver::new(auth),
            cascade: SettingsCascade::new(directory, prefs),
            cart: TenantCartStore::new(carts),
        }
    }

    /// Run the activation pipeline for one navigation event.
    ///
    /// With no resolvable tenant the landing state is reported and the cart
    /// is left untouched (it still belongs to the last tenant, invisible
    /// behind the tenant-less UI).
    pub async fn navigate(&self, nav: &Navigation) -> Activation {
        let Some(tenant) = self.resolver.resolve(nav).await else {
            debug!("navigation resolved to landing state");
            return Activation {
                tenant: None,
                settings: self.cascade.landing().await,
            };
        };

        let settings = self.cascade.resolve(&tenant).await;
        self.cart.set_active_tenant(&tenant).await;

        Activation {
            tenant: Some(tenant),
            settings,
        }
    }

    /// Record an explicit language choice by the visitor
    pub async fn set_language(&self, language: Language) {
        self.cascade.set_language(language).await;
    }

    /// The cart of the currently active tenant
    pub fn cart(&self) -> &TenantCartStore {
        &self.cart
    }

    /// The settings cascade (current settings view, language changes)
    pub fn settings(&self) -> &SettingsCascade {
        &self.cascade
    }
}
