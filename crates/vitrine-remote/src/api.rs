//! Storefront API client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use vitrine_core::gateway::{AdminClaim, AuthGateway, PlatformDirectory};
use vitrine_core::settings::StoreSettings;
use vitrine_core::tenant::{Platform, TenantCode};

use crate::client::{create_client, with_retry, HttpClientConfig};
use crate::{RemoteError, Result};

/// Storefront API client configuration
#[derive(Debug, Clone)]
pub struct StorefrontApiConfig {
    /// Base URL of the storefront deployment (e.g. `https://shop.example`)
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl StorefrontApiConfig {
    /// Create a configuration for the given deployment base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_config: HttpClientConfig::default(),
        }
    }
}

/// HTTP client for the storefront REST API.
///
/// Implements both collaborator traits of the client-state core:
/// `AuthGateway` (admin claim lookup) and `PlatformDirectory` (platform
/// records and settings documents). All calls are GETs and retried on
/// transient failures.
pub struct StorefrontApi {
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Wire shape of `GET /api/auth/check`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthCheckResponse {
    #[serde(default)]
    is_logged_in: bool,
    #[serde(default)]
    is_super_admin: bool,
    #[serde(default)]
    admin_platform: Option<String>,
}

impl StorefrontApi {
    /// Create a new storefront API client
    pub fn new(config: StorefrontApiConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            max_retries: config.client_config.max_retries,
        })
    }

    /// GET a JSON document, mapping 404 to `None` and other non-2xx
    /// statuses to `RemoteError::Api`.
    async fn get_optional_json<T>(&self, url: String) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        with_retry(self.max_retries, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status.as_u16() == 404 {
                    return Ok(None);
                }
                if !status.is_success() {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "unable to read error body".to_string());
                    return Err(RemoteError::Api {
                        status_code: status.as_u16(),
                        message,
                    });
                }

                let value = response.json::<T>().await?;
                Ok(Some(value))
            }
        })
        .await
    }
}

#[async_trait]
impl AuthGateway for StorefrontApi {
    #[instrument(skip(self))]
    async fn admin_claim(&self) -> vitrine_core::Result<Option<AdminClaim>> {
        let url = format!("{}/api/auth/check", self.base_url);
        let response: Option<AuthCheckResponse> = self
            .get_optional_json(url)
            .await
            .map_err(vitrine_core::Error::from)?;

        let Some(check) = response else {
            return Ok(None);
        };
        if !check.is_logged_in {
            debug!("no authenticated admin session");
            return Ok(None);
        }

        // A claim carrying a malformed platform code still identifies an
        // admin session; it just binds to no tenant.
        let platform = check.admin_platform.as_deref().and_then(|code| {
            TenantCode::new(code)
                .inspect_err(|e| warn!(code, error = %e, "invalid admin platform in claim"))
                .ok()
        });

        Ok(Some(AdminClaim {
            platform,
            is_super_admin: check.is_super_admin,
        }))
    }
}

#[async_trait]
impl PlatformDirectory for StorefrontApi {
    #[instrument(skip(self), fields(platform = %code))]
    async fn settings(&self, code: &TenantCode) -> vitrine_core::Result<Option<StoreSettings>> {
        let url = format!("{}/api/settings?platform={}", self.base_url, code);
        self.get_optional_json(url)
            .await
            .map_err(vitrine_core::Error::from)
    }

    #[instrument(skip(self), fields(platform = %code))]
    async fn platform(&self, code: &TenantCode) -> vitrine_core::Result<Option<Platform>> {
        let url = format!("{}/api/platforms/{}", self.base_url, code);
        self.get_optional_json(url)
            .await
            .map_err(vitrine_core::Error::from)
    }
}
