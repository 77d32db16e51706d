//! # Provisor Domain
//!
//! Business domain types and models for Provisor.
//!
//! This crate contains:
//! - Resource records (Device, Certificate, BundleId, Profile)
//! - Wire envelope types for the provisioning API
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Provisor crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
