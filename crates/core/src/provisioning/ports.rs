//! Port interfaces for the signing directory
//!
//! These traits define the boundary between the reconciliation logic and
//! the provisioning API. List calls return whole cached snapshots; the
//! repository behind them decides when to actually fetch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use provisor_domain::{BundleId, Certificate, Device, NewProfile, Profile, Result};

/// Read and mutate access to the account's provisioning profiles
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// All profiles in the account (cached snapshot)
    async fn profiles(&self) -> Result<Vec<Profile>>;

    /// Create a profile; membership is fixed at creation
    async fn create_profile(&self, new: NewProfile) -> Result<Profile>;

    /// Delete a profile by id
    async fn delete_profile(&self, id: &str) -> Result<()>;

    /// Swap a replaced profile into the cached snapshot
    ///
    /// Drops any cached entry with `stale_name` and appends `replacement`,
    /// so a later lookup sees the directory as the server now has it.
    async fn replace_cached_profile(&self, stale_name: &str, replacement: Profile);
}

/// Read access to the account's registered devices
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// All registered devices (cached snapshot)
    async fn devices(&self) -> Result<Vec<Device>>;
}

/// Read access to the account's signing certificates
#[async_trait]
pub trait CertificateDirectory: Send + Sync {
    /// All signing certificates (cached snapshot)
    async fn certificates(&self) -> Result<Vec<Certificate>>;
}

/// Read access to the account's registered bundle ids
#[async_trait]
pub trait BundleIdDirectory: Send + Sync {
    /// All registered bundle ids (cached snapshot)
    async fn bundle_ids(&self) -> Result<Vec<BundleId>>;
}

/// Identity fields extracted from a decoded `.mobileprovision` payload
#[derive(Debug, Clone)]
pub struct PayloadSummary {
    /// Bundle identifier, team prefix stripped
    pub app_id: String,

    /// Expiry recorded in the payload
    pub expiration_date: Option<DateTime<Utc>>,

    /// String-valued entitlements found in the payload
    pub entitlements: BTreeMap<String, String>,
}

/// Extracts identity fields from a decoded `.mobileprovision` payload
///
/// Pure computation over the payload bytes; used when a reconcile request
/// supplies no bundle identifier hint.
pub trait ProfilePayloadInspector: Send + Sync {
    /// Inspect a decoded payload
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the payload does not contain
    /// the expected identity fields.
    fn inspect(&self, payload: &[u8]) -> Result<PayloadSummary>;
}
