//! Price formatting in the tenant's display currency

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::settings::CurrencyConfig;

/// Display symbols for the currencies the storefront knows about
static CURRENCY_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USD", "$"),
        ("SP", "ل.س"),
        ("EUR", "€"),
        ("GBP", "£"),
    ])
});

/// Get the display symbol for a currency code, falling back to the code
/// itself for currencies without a known symbol.
pub fn currency_symbol(code: &str) -> &str {
    CURRENCY_SYMBOLS.get(code).copied().unwrap_or(code)
}

/// Format a USD reference price in the tenant's display currency.
///
/// USD display keeps two decimals with a leading `$`; any other display
/// currency converts through the exchange rate and rounds to a whole amount
/// with thousands separators, symbol appended.
pub fn format_price(price_usd: f64, config: &CurrencyConfig) -> String {
    if config.display_currency == "USD" {
        return format!("${price_usd:.2}");
    }

    let converted = (price_usd * config.exchange_rate).round() as i64;
    format!(
        "{} {}",
        group_thousands(converted),
        currency_symbol(&config.display_currency)
    )
}

/// Insert a `,` separator every three digits
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syrian_pounds(rate: f64) -> CurrencyConfig {
        CurrencyConfig {
            base_currency: "USD".to_string(),
            exchange_rate: rate,
            display_currency: "SP".to_string(),
        }
    }

    #[test]
    fn test_format_usd_keeps_decimals() {
        let config = CurrencyConfig::default();
        assert_eq!(format_price(12.5, &config), "$12.50");
        assert_eq!(format_price(0.0, &config), "$0.00");
    }

    #[test]
    fn test_format_converted_rounds_whole() {
        let config = syrian_pounds(15000.0);
        assert_eq!(format_price(1.0, &config), "15,000 ل.س");
        assert_eq!(format_price(2.5, &config), "37,500 ل.س");
    }

    #[test]
    fn test_format_unknown_currency_uses_code() {
        let config = CurrencyConfig {
            base_currency: "USD".to_string(),
            exchange_rate: 2.0,
            display_currency: "XYZ".to_string(),
        };
        assert_eq!(format_price(10.0, &config), "20 XYZ");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-45000), "-45,000");
    }

    #[test]
    fn test_currency_symbol_lookup() {
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("AED"), "AED");
    }
}
