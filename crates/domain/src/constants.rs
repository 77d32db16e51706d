//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! provisioning client.

// Provisioning API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.appstoreconnect.apple.com/v1";
pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";

// Token lifecycle
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 120;
pub const SHORT_WINDOW_MARGIN_SECS: i64 = 30;
pub const LONG_WINDOW_MARGIN_SECS: i64 = 60;
// Windows at or below this length use the short margin
pub const MARGIN_STEP_SECS: i64 = 180;

// Request executor defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_BUDGET: u32 = 2;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 250;

// Collection fetch defaults
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_MAX_PAGES: u32 = 100;
