//! Configuration structures
//!
//! Plain serde structures describing client configuration. Loading (env
//! probing, file fallback) lives in the infra crate.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BASE_BACKOFF_MS, DEFAULT_MAX_PAGES, DEFAULT_RETRY_BUDGET,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_VALIDITY_SECS, MAX_PAGE_SIZE,
};

/// Top-level configuration for the provisioning client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub connect: ConnectConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Credentials for signing provisioning API tokens
///
/// `private_key` holds either a filesystem path to a `.p8` key file or the
/// PEM content itself. Classification happens once when the signer is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectConfig {
    pub issuer_id: String,
    pub key_id: String,
    pub private_key: String,
    #[serde(default = "default_token_validity")]
    pub token_validity_seconds: i64,
}

/// Request executor tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            retry_budget: default_retry_budget(),
            base_backoff_ms: default_base_backoff(),
            max_pages: default_max_pages(),
            page_size: default_page_size(),
        }
    }
}

fn default_token_validity() -> i64 {
    DEFAULT_TOKEN_VALIDITY_SECS
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_budget() -> u32 {
    DEFAULT_RETRY_BUDGET
}

fn default_base_backoff() -> u64 {
    DEFAULT_BASE_BACKOFF_MS
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}
