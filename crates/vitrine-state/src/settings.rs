//! Effective settings resolution (the cascade)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vitrine_core::gateway::PlatformDirectory;
use vitrine_core::keyed_store::KeyedStore;
use vitrine_core::settings::{
    CurrencyConfig, EffectiveSettings, Language, LanguageOverride,
};
use vitrine_core::tenant::TenantCode;

/// Preference store namespace for the browser-global language override
const LANGUAGE_PREF_NAMESPACE: &str = "customer_language";

/// Resolves `EffectiveSettings` for a tenant by cascading configuration
/// sources.
///
/// The asymmetry is the whole point of this component: language is a
/// personal, browser-level preference that sticks across tenant switches
/// once chosen, while currency is a property of the tenant's catalog and is
/// always taken from the latest remote resolution. A locally cached exchange
/// rate would misprice goods; a locally cached language is exactly what the
/// visitor asked for.
///
/// Resolution never fails: every remote error degrades to platform defaults
/// and then to the deployment defaults (Arabic, identity-rate USD).
pub struct SettingsCascade {
    directory: Arc<dyn PlatformDirectory>,
    prefs: Arc<dyn KeyedStore>,

    // Monotonic resolution token. A resolve only commits to `current` if no
    // newer resolve started while its fetches were in flight, which is what
    // keeps a stale fetch for tenant A from overwriting tenant B's settings
    // after a fast navigation.
    epoch: AtomicU64,
    current: Mutex<Option<(TenantCode, EffectiveSettings)>>,
}

impl SettingsCascade {
    /// Create a cascade over a platform directory and a preference store
    pub fn new(directory: Arc<dyn PlatformDirectory>, prefs: Arc<dyn KeyedStore>) -> Self {
        Self {
            directory,
            prefs,
            epoch: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Resolve effective settings for `tenant`.
    ///
    /// Always returns a complete value. The result is additionally recorded
    /// as the cascade's current view unless a newer resolution started in
    /// the meantime (stale results are computed but discarded).
    pub async fn resolve(&self, tenant: &TenantCode) -> EffectiveSettings {
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let (remote_language, currency) = self.fetch_remote(tenant).await;
        let language = self.stabilize_language(remote_language).await;

        let effective = EffectiveSettings { language, currency };

        // The staleness check must happen under the same lock as the commit:
        // checked first, a newer resolution could commit in the gap and then
        // be overwritten by this one.
        let mut current = self.current.lock().await;
        if self.epoch.load(Ordering::SeqCst) == token {
            *current = Some((tenant.clone(), effective.clone()));
        } else {
            debug!(tenant = %tenant, token, "discarding stale settings resolution");
        }

        effective
    }

    /// The last committed resolution, if any
    pub async fn current(&self) -> Option<(TenantCode, EffectiveSettings)> {
        self.current.lock().await.clone()
    }

    /// Record an explicit language choice by the visitor.
    ///
    /// Writes the browser-global override and updates the current view;
    /// currency is untouched.
    pub async fn set_language(&self, language: Language) {
        self.write_override(language).await;
        let mut current = self.current.lock().await;
        if let Some((_, settings)) = current.as_mut() {
            settings.language = language;
        }
    }

    /// Settings for the tenant-less landing state: the visitor's language
    /// preference if one exists, deployment defaults otherwise. Performs no
    /// writes.
    pub async fn landing(&self) -> EffectiveSettings {
        EffectiveSettings {
            language: self.load_override().await.unwrap_or_default(),
            currency: CurrencyConfig::default(),
        }
    }

    /// Fetch the remote language default and currency configuration,
    /// degrading through the fallback chain: settings document, platform
    /// record, hard-coded defaults.
    async fn fetch_remote(&self, tenant: &TenantCode) -> (Option<Language>, CurrencyConfig) {
        match self.directory.settings(tenant).await {
            Ok(Some(doc)) => {
                let currency = CurrencyConfig::from_settings(&doc);
                let language = match doc.language {
                    Some(lang) => Some(lang),
                    // Documents predating the language field fall back to
                    // the platform's own default.
                    None => self.platform_default_language(tenant).await,
                };
                (language, currency)
            }
            Ok(None) => {
                debug!(tenant = %tenant, "no settings document, using platform defaults");
                (
                    self.platform_default_language(tenant).await,
                    CurrencyConfig::default(),
                )
            }
            Err(e) => {
                warn!(tenant = %tenant, error = %e, "settings fetch failed, using defaults");
                (
                    self.platform_default_language(tenant).await,
                    CurrencyConfig::default(),
                )
            }
        }
    }

    async fn platform_default_language(&self, tenant: &TenantCode) -> Option<Language> {
        match self.directory.platform(tenant).await {
            Ok(Some(platform)) => Some(platform.default_language),
            Ok(None) => None,
            Err(e) => {
                warn!(tenant = %tenant, error = %e, "platform fetch failed");
                None
            }
        }
    }

    /// Apply the language precedence: an existing override wins untouched;
    /// otherwise adopt the remote/tenant default and persist it as the
    /// override so later visits stay stable. The write happens only on this
    /// first stabilization, never on every resolution.
    async fn stabilize_language(&self, remote: Option<Language>) -> Language {
        if let Some(language) = self.load_override().await {
            return language;
        }
        let language = remote.unwrap_or_default();
        self.write_override(language).await;
        language
    }

    async fn load_override(&self) -> Option<Language> {
        let blob = match self.prefs.get(LANGUAGE_PREF_NAMESPACE).await {
            Ok(blob) => blob?,
            Err(e) => {
                warn!(error = %e, "language preference unreadable");
                return None;
            }
        };
        match serde_json::from_slice::<LanguageOverride>(&blob) {
            Ok(pref) => Some(pref.language),
            Err(e) => {
                warn!(error = %e, "corrupt language preference, ignoring");
                None
            }
        }
    }

    async fn write_override(&self, language: Language) {
        let blob = match serde_json::to_vec(&LanguageOverride { language }) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to encode language preference");
                return;
            }
        };
        // Preference persistence is best-effort; a blocked store costs the
        // visitor their saved language, nothing more.
        if let Err(e) = self.prefs.set(LANGUAGE_PREF_NAMESPACE, blob).await {
            warn!(error = %e, "failed to persist language preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Notify;
    use vitrine_core::settings::StoreSettings;
    use vitrine_core::tenant::Platform;
    use vitrine_core::{Error, Result};
    use vitrine_storage::MemoryKeyedStore;

    /// Directory fake with per-tenant canned responses and an optional gate
    /// that holds one tenant's settings fetch open until released.
    #[derive(Default)]
    struct FakeDirectory {
        settings: HashMap<String, StoreSettings>,
        platforms: HashMap<String, Platform>,
        fail_settings: bool,
        gate: Option<(String, Arc<Notify>)>,
    }

    impl FakeDirectory {
        fn with_settings(mut self, code: &str, doc: StoreSettings) -> Self {
            let _ = self.settings.insert(code.to_string(), doc);
            self
        }

        fn with_platform(mut self, code: &str, language: Language) -> Self {
            let platform = Platform {
                code: TenantCode::new(code).unwrap(),
                name: code.to_string(),
                active: true,
                default_language: language,
                logo_url: None,
            };
            let _ = self.platforms.insert(code.to_string(), platform);
            self
        }

        fn gated_on(mut self, code: &str, gate: Arc<Notify>) -> Self {
            self.gate = Some((code.to_string(), gate));
            self
        }
    }

    #[async_trait]
    impl PlatformDirectory for FakeDirectory {
        async fn settings(&self, code: &TenantCode) -> Result<Option<StoreSettings>> {
            if let Some((gated_code, gate)) = &self.gate
                && gated_code == code.as_str()
            {
                gate.notified().await;
            }
            if self.fail_settings {
                return Err(Error::RemoteFetch("settings unreachable".to_string()));
            }
            Ok(self.settings.get(code.as_str()).cloned())
        }

        async fn platform(&self, code: &TenantCode) -> Result<Option<Platform>> {
            Ok(self.platforms.get(code.as_str()).cloned())
        }
    }

    fn doc(language: Option<Language>, rate: f64, display: &str) -> StoreSettings {
        StoreSettings {
            language,
            currency: "USD".to_string(),
            exchange_rate: rate,
            display_currency: display.to_string(),
            hero_title: None,
            hero_subtitle: None,
        }
    }

    fn tenant(code: &str) -> TenantCode {
        TenantCode::new(code).unwrap()
    }

    /// Preference store that holds its first `get` open until released,
    /// parking a resolution between its remote fetch and its commit.
    struct GatedPrefs {
        inner: MemoryKeyedStore,
        gate: Arc<Notify>,
        armed: std::sync::atomic::AtomicBool,
    }

    impl GatedPrefs {
        fn new(gate: Arc<Notify>) -> Self {
            Self {
                inner: MemoryKeyedStore::new(),
                gate,
                armed: std::sync::atomic::AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl KeyedStore for GatedPrefs {
        async fn get(&self, namespace: &str) -> Result<Option<Vec<u8>>> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.gate.notified().await;
            }
            self.inner.get(namespace).await
        }

        async fn set(&self, namespace: &str, blob: Vec<u8>) -> Result<()> {
            self.inner.set(namespace, blob).await
        }

        async fn remove(&self, namespace: &str) -> Result<()> {
            self.inner.remove(namespace).await
        }
    }

    #[tokio::test]
    async fn test_override_wins_over_remote_language() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        prefs
            .set(
                LANGUAGE_PREF_NAMESPACE,
                serde_json::to_vec(&LanguageOverride {
                    language: Language::En,
                })
                .unwrap(),
            )
            .await
            .unwrap();

        let directory =
            FakeDirectory::default().with_settings("roze", doc(Some(Language::Ar), 15000.0, "SP"));
        let cascade = SettingsCascade::new(Arc::new(directory), prefs);

        let effective = cascade.resolve(&tenant("roze")).await;
        assert_eq!(effective.language, Language::En);
        // Currency still follows the remote document
        assert_eq!(effective.currency.exchange_rate, 15000.0);
    }

    #[tokio::test]
    async fn test_remote_language_adopted_and_persisted_when_no_override() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let directory =
            FakeDirectory::default().with_settings("roze", doc(Some(Language::Ar), 1.0, "USD"));
        let cascade = SettingsCascade::new(Arc::new(directory), Arc::clone(&prefs) as _);

        let effective = cascade.resolve(&tenant("roze")).await;
        assert_eq!(effective.language, Language::Ar);

        let stored: LanguageOverride = serde_json::from_slice(
            &prefs.get(LANGUAGE_PREF_NAMESPACE).await.unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(stored.language, Language::Ar);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_platform_default() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let directory = FakeDirectory {
            fail_settings: true,
            ..FakeDirectory::default()
        }
        .with_platform("roze", Language::En);
        let cascade = SettingsCascade::new(Arc::new(directory), prefs);

        let effective = cascade.resolve(&tenant("roze")).await;
        assert_eq!(effective.language, Language::En);
        assert_eq!(effective.currency, CurrencyConfig::default());
    }

    #[tokio::test]
    async fn test_everything_failing_degrades_to_deployment_defaults() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let directory = FakeDirectory {
            fail_settings: true,
            ..FakeDirectory::default()
        };
        let cascade = SettingsCascade::new(Arc::new(directory), prefs);

        let effective = cascade.resolve(&tenant("ghost")).await;
        assert_eq!(effective.language, Language::Ar);
        assert_eq!(effective.currency, CurrencyConfig::default());
    }

    #[tokio::test]
    async fn test_currency_ignores_override_state() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        prefs
            .set(
                LANGUAGE_PREF_NAMESPACE,
                serde_json::to_vec(&LanguageOverride {
                    language: Language::En,
                })
                .unwrap(),
            )
            .await
            .unwrap();

        let directory =
            FakeDirectory::default().with_settings("roze", doc(Some(Language::Ar), 500.0, "EUR"));
        let cascade = SettingsCascade::new(Arc::new(directory), prefs);

        let effective = cascade.resolve(&tenant("roze")).await;
        assert_eq!(effective.currency.display_currency, "EUR");
        assert_eq!(effective.currency.exchange_rate, 500.0);
    }

    #[tokio::test]
    async fn test_set_language_updates_override_and_current() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let directory =
            FakeDirectory::default().with_settings("roze", doc(Some(Language::Ar), 1.0, "USD"));
        let cascade = SettingsCascade::new(Arc::new(directory), Arc::clone(&prefs) as _);

        let _ = cascade.resolve(&tenant("roze")).await;
        cascade.set_language(Language::En).await;

        let (_, settings) = cascade.current().await.unwrap();
        assert_eq!(settings.language, Language::En);

        // And the override sticks for the next resolution
        let effective = cascade.resolve(&tenant("roze")).await;
        assert_eq!(effective.language, Language::En);
    }

    #[tokio::test]
    async fn test_stale_resolution_does_not_overwrite_newer_tenant() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let gate = Arc::new(Notify::new());
        let directory = FakeDirectory::default()
            .with_settings("alpha", doc(Some(Language::Ar), 100.0, "SP"))
            .with_settings("beta", doc(Some(Language::Ar), 200.0, "EUR"))
            .gated_on("alpha", Arc::clone(&gate));
        let cascade = Arc::new(SettingsCascade::new(Arc::new(directory), prefs));

        // Start resolving alpha; its settings fetch blocks on the gate.
        let stale = tokio::spawn({
            let cascade = Arc::clone(&cascade);
            async move { cascade.resolve(&tenant("alpha")).await }
        });
        tokio::task::yield_now().await;

        // Navigate to beta while alpha is still in flight.
        let _ = cascade.resolve(&tenant("beta")).await;

        // Let alpha's fetch complete late.
        gate.notify_one();
        let stale_result = stale.await.unwrap();
        assert_eq!(stale_result.currency.display_currency, "SP");

        // The committed view still belongs to beta.
        let (code, settings) = cascade.current().await.unwrap();
        assert_eq!(code, tenant("beta"));
        assert_eq!(settings.currency.display_currency, "EUR");
    }

    #[tokio::test]
    async fn test_resolution_finishing_after_newer_commit_is_discarded() {
        let gate = Arc::new(Notify::new());
        let prefs = Arc::new(GatedPrefs::new(Arc::clone(&gate)));
        let directory = FakeDirectory::default()
            .with_settings("alpha", doc(Some(Language::Ar), 100.0, "SP"))
            .with_settings("beta", doc(Some(Language::Ar), 200.0, "EUR"));
        let cascade = Arc::new(SettingsCascade::new(Arc::new(directory), prefs));

        // Alpha's fetch completes, then it parks just before committing.
        let stale = tokio::spawn({
            let cascade = Arc::clone(&cascade);
            async move { cascade.resolve(&tenant("alpha")).await }
        });
        tokio::task::yield_now().await;

        // Beta starts later and commits while alpha is parked.
        let _ = cascade.resolve(&tenant("beta")).await;

        gate.notify_one();
        let stale_result = stale.await.unwrap();
        assert_eq!(stale_result.currency.display_currency, "SP");

        // Alpha's late commit attempt must not overwrite beta's.
        let (code, settings) = cascade.current().await.unwrap();
        assert_eq!(code, tenant("beta"));
        assert_eq!(settings.currency.display_currency, "EUR");
    }

    #[tokio::test]
    async fn test_landing_uses_override_without_writes() {
        let prefs = Arc::new(MemoryKeyedStore::new());
        let cascade = SettingsCascade::new(
            Arc::new(FakeDirectory::default()),
            Arc::clone(&prefs) as _,
        );

        // No override yet: defaults, and nothing gets written
        let landing = cascade.landing().await;
        assert_eq!(landing.language, Language::Ar);
        assert!(prefs.get(LANGUAGE_PREF_NAMESPACE).await.unwrap().is_none());

        cascade.set_language(Language::En).await;
        let landing = cascade.landing().await;
        assert_eq!(landing.language, Language::En);
    }
}
