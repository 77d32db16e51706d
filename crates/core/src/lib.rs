//! # Provisor Core
//!
//! Pure provisioning logic - no HTTP, no filesystem, no key material.
//!
//! This crate contains:
//! - Port interfaces over the account's signing directory
//! - Membership selection rules (devices, certificates)
//! - The profile reconciliation service
//!
//! ## Architecture Principles
//! - Only depends on `provisor-domain`
//! - All network access via traits implemented in `provisor-infra`
//! - Deterministic, testable against in-memory mocks

pub mod provisioning;

// Re-export the service surface for convenience
pub use provisioning::ports::{
    BundleIdDirectory, CertificateDirectory, DeviceDirectory, PayloadSummary, ProfileDirectory,
    ProfilePayloadInspector,
};
pub use provisioning::selection::{signing_certificates, valid_devices};
pub use provisioning::service::{ReconcileReport, ReconcileRequest, ReconcileService};
