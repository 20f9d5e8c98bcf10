//! End-to-end test fixtures for the Vitrine client-state core
//!
//! Wires a `Storefront` session against a wiremock storefront API and a
//! temp-directory file store, the same shape as a production deployment.

use std::path::Path;
use std::sync::Arc;

use vitrine_remote::client::HttpClientConfig;
use vitrine_remote::{StorefrontApi, StorefrontApiConfig};
use vitrine_state::Storefront;
use vitrine_storage::FileKeyedStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a storefront session against `api_base`, persisting under `root`.
///
/// Reopening over the same `root` models a browser restart: anything
/// written through must still be there.
pub fn storefront_session(api_base: &str, root: &Path) -> Storefront {
    let mut config = StorefrontApiConfig::new(api_base);
    config.client_config = HttpClientConfig {
        max_retries: 0,
        ..HttpClientConfig::default()
    };
    let api = Arc::new(StorefrontApi::new(config).expect("client"));

    let prefs = Arc::new(FileKeyedStore::new(root.join("prefs")).expect("prefs store"));
    let carts = Arc::new(FileKeyedStore::new(root.join("carts")).expect("cart store"));

    Storefront::new(Arc::clone(&api) as _, api, prefs, carts)
}

/// Mount a logged-out auth check response
pub async fn mock_public_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/auth/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isLoggedIn": false,
            "isSuperAdmin": false
        })))
        .mount(server)
        .await;
}

/// Mount an admin session bound to `platform`
pub async fn mock_admin_session(server: &MockServer, platform: &str) {
    Mock::given(method("GET"))
        .and(path("/api/auth/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isLoggedIn": true,
            "isSuperAdmin": false,
            "adminPlatform": platform
        })))
        .mount(server)
        .await;
}

/// Mount a settings document for `platform`
pub async fn mock_settings(
    server: &MockServer,
    platform: &str,
    language: &str,
    exchange_rate: f64,
    display_currency: &str,
) {
    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .and(query_param("platform", platform))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "language": language,
            "currency": "USD",
            "exchangeRate": exchange_rate,
            "displayCurrency": display_currency
        })))
        .mount(server)
        .await;
}
