//! Shared HTTP client utilities

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{RemoteError, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Maximum number of retries for transient errors
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            // Settings/platform lookups gate first paint; a slow API must
            // degrade to defaults quickly rather than hang the storefront.
            timeout_secs: 10,
            connect_timeout_secs: 5,
            pool_max_idle_per_host: 8,
            max_retries: 2,
            user_agent: format!("Vitrine/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
        .map_err(|e| RemoteError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Retry policy for transient errors.
///
/// Every call made through this module is an idempotent GET, so retrying on
/// connect errors, timeouts and 5xx/429 is safe.
pub async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff_ms = 2u64.pow(attempt - 1) * 100;
            debug!(
                backoff_ms,
                attempt, max_retries, "retrying storefront API request"
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let should_retry = match &e {
                    RemoteError::Http(req_err) => {
                        req_err.is_connect() || req_err.is_timeout() || req_err.is_request()
                    }
                    RemoteError::Api { status_code, .. } => {
                        matches!(status_code, 429 | 500 | 502 | 503 | 504)
                    }
                    RemoteError::Config(_) => false,
                };

                if should_retry && attempt < max_retries {
                    warn!(attempt = attempt + 1, max_retries, error = %e, "transient API failure");
                    last_error = Some(e);
                } else {
                    return Err(e);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| RemoteError::Config("retry loop exited without an error".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failure() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(3, || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(RemoteError::Api {
                    status_code: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_retry_client_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_retry(3, || async {
            let _ = attempts.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Api {
                status_code: 400,
                message: "bad request".to_string(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_retry(2, || async {
            let _ = attempts.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Api {
                status_code: 500,
                message: "boom".to_string(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
