//! Store connection configuration.

use std::time::Duration;

/// Default store endpoint when nothing is configured.
pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:8001";

/// Default per-request timeout (60 seconds). Region selects over large
/// intervals are drained in full before returning, so this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the connection to the remote variant store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the store's HTTP gateway (e.g. "http://127.0.0.1:8001").
    pub base_url: String,
    /// Upper bound on a single request, including draining streamed replies.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                 |
    /// |------------------------|-------------------------|
    /// | `DNAERYS_URL`          | `http://127.0.0.1:8001` |
    /// | `DNAERYS_TIMEOUT_SECS` | `60`                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`], reading variables through `lookup`.
    /// Unparseable timeouts fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout = lookup("DNAERYS_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            base_url: lookup("DNAERYS_URL").unwrap_or_else(|| DEFAULT_STORE_URL.into()),
            timeout,
        }
    }
}
