//! Remote store configuration
//!
//! The endpoint and credential are passed explicitly to the adapter; whether
//! cloud sync is available is a pure function of this struct.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Connection settings for the household table
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project base URL (e.g. `https://xyz.supabase.co`)
    #[serde(default)]
    pub endpoint: Option<Url>,

    /// API key sent as `apikey` and bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Table holding one row per household
    #[serde(default = "default_table")]
    pub table: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "households".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// Create a configuration for `endpoint` with `api_key`
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Endpoint and a non-empty key are both present
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Replace endpoint and/or key where an override is given
    pub fn with_overrides(mut self, endpoint: Option<Url>, api_key: Option<String>) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }
}

// Keep the key out of logs
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
