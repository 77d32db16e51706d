//! HTTP client for the provisioning API
//!
//! This module talks to the App Store Connect v1 resource API: signed
//! bearer tokens, a retrying request executor, and a typed repository
//! over the directory resources.
//!
//! # Architecture
//!
//! - Requests are immutable [`RequestDescriptor`] values built per call
//! - The executor re-reads the token cache on every attempt, so a forced
//!   resign is picked up mid-call
//! - Structured error bodies are classified by `provisor-common`'s
//!   [`RetryPolicy`](provisor_common::RetryPolicy); transport failures
//!   retry within the same budget
//! - Collection endpoints are consumed whole through the executor's
//!   bounded pagination loop
//! - The repository caches each directory list until invalidated and
//!   implements the `provisor-core` port traits

pub mod auth;
pub mod executor;
pub mod repository;
pub mod request;

pub use auth::{token_provider, AccessTokenProvider};
pub use executor::{ExecutorConfig, RequestExecutor, RequestExecutorBuilder};
pub use repository::ProvisioningRepository;
pub use request::RequestDescriptor;
