//! Profile reconciliation
//!
//! Keeps a named provisioning profile in sync with the account's current
//! device and certificate inventory. The directory itself is reached
//! through ports; `provisor-infra` wires them to the resource repository.

pub mod ports;
pub mod selection;
pub mod service;

pub use ports::{
    BundleIdDirectory, CertificateDirectory, DeviceDirectory, PayloadSummary, ProfileDirectory,
    ProfilePayloadInspector,
};
pub use service::{ReconcileReport, ReconcileRequest, ReconcileService};
