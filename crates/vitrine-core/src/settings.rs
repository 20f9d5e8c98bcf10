//! Display settings: language, currency configuration and effective settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Storefront display language.
///
/// Arabic is the deployment-wide default: a brand-new platform with no
/// settings document renders in Arabic until its administrator changes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ar => write!(f, "ar"),
            Self::En => write!(f, "en"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Self::Ar),
            "en" => Ok(Self::En),
            other => Err(Error::InvalidTenant(format!(
                "unsupported language: {other:?}"
            ))),
        }
    }
}

/// The remote settings document served by `GET /api/settings?platform={code}`.
///
/// All fields are optional on the wire: older documents predate the
/// language field, and the hero fields only exist for platforms whose
/// administrators customized the landing banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    /// Platform display language, if the administrator has set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Base (reference price) currency code
    #[serde(default = "default_base_currency")]
    pub currency: String,

    /// Exchange rate from the base currency to the display currency
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,

    /// Currency code prices are displayed in
    #[serde(default = "default_base_currency")]
    pub display_currency: String,

    /// Landing banner title, if customized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,

    /// Landing banner subtitle, if customized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_exchange_rate() -> f64 {
    1.0
}

/// Resolved currency configuration for a tenant.
///
/// There is deliberately no local override for any of these fields: prices
/// must stay consistent with what the tenant administrator configured, so
/// currency is always taken from the latest remote resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyConfig {
    /// Currency reference prices are stored in
    pub base_currency: String,

    /// Exchange rate from base to display currency, strictly positive
    pub exchange_rate: f64,

    /// Currency prices are displayed in
    pub display_currency: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            exchange_rate: 1.0,
            display_currency: "USD".to_string(),
        }
    }
}

impl CurrencyConfig {
    /// Build a currency configuration from a remote settings document.
    ///
    /// A non-positive exchange rate is a misconfigured document and falls
    /// back to the identity rate rather than mispricing the catalog.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        let exchange_rate = if settings.exchange_rate > 0.0 {
            settings.exchange_rate
        } else {
            tracing::warn!(
                rate = settings.exchange_rate,
                "non-positive exchange rate in settings, using 1.0"
            );
            1.0
        };
        Self {
            base_currency: settings.currency.clone(),
            exchange_rate,
            display_currency: settings.display_currency.clone(),
        }
    }
}

/// The per-tenant, per-session resolved display settings.
///
/// Derived, never stored authoritatively: recomputed from platform defaults,
/// the remote settings document and the local language override on each
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// Effective display language
    pub language: Language,

    /// Effective currency configuration
    pub currency: CurrencyConfig,
}

/// Browser-profile-global language preference.
///
/// Not tenant-scoped: once a visitor picks a language it follows them across
/// every platform they browse, which is the one piece of local state that is
/// allowed to win over remote settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOverride {
    pub language: Language,
}
