//! Shared client primitives for the Provisor crates.
//!
//! Everything here is transport-agnostic: credential signing and caching,
//! retry classification, and the list cache used by the resource repository.
//! The HTTP layer lives in `provisor-infra`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod cache;
pub mod retry;

// Re-export commonly used types for convenience
// ------------------------
pub use auth::{Credential, KeySource, TokenCache, TokenSigner};
pub use cache::ListCache;
pub use retry::{RetryDirective, RetryPolicy};
