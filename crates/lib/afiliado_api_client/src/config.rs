//! API client configuration.

use std::time::Duration;

use crate::ClientError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`ApiClient`](crate::http::ApiClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL every request path is appended to, without trailing slash.
    pub base_url: String,
    /// Per-request timeout; requests are never cancelled before it.
    pub timeout: Duration,
    /// Log request failures to the diagnostic sink before notifying.
    pub log_failures: bool,
}

impl ClientConfig {
    /// Config for `base_url` with default timeout and diagnostics.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            log_failures: cfg!(debug_assertions),
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                    | Default                       |
    /// |-----------------------------|-------------------------------|
    /// | `AFILIADO_API_URL`          | `http://localhost:8000/api`   |
    /// | `AFILIADO_API_TIMEOUT_SECS` | `10`                          |
    /// | `AFILIADO_DEV`              | on in debug builds            |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("AFILIADO_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = lookup("AFILIADO_API_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let log_failures = lookup("AFILIADO_DEV")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(cfg!(debug_assertions));

        Self {
            base_url,
            timeout,
            log_failures,
        }
    }

    /// Checks the base URL and strips its trailing slash.
    pub(crate) fn normalized_base_url(&self) -> Result<String, ClientError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let parsed = url::Url::parse(trimmed)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "{trimmed}: unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(trimmed.to_string())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
