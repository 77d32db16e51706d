//! # Provisor Infrastructure
//!
//! Infrastructure implementations of the core provisioning ports.
//!
//! This crate contains:
//! - HTTP request executor (bearer auth, retry, pagination)
//! - Typed resource repository with per-type list caches
//! - Provisioning payload inspector (plist marker scan)
//! - Configuration loading (environment first, file fallback)
//!
//! ## Architecture
//! - Implements the directory traits defined in `provisor-core`
//! - Depends on `provisor-common` for signing, retry, and cache primitives
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod payload;

// Re-export commonly used items
pub use api::{
    token_provider, AccessTokenProvider, ExecutorConfig, ProvisioningRepository,
    RequestDescriptor, RequestExecutor, RequestExecutorBuilder,
};
pub use payload::PlistScanInspector;
