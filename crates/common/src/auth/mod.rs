//! Connect API credential handling
//!
//! Covers the full token lifecycle for the provisioning API:
//! - Key material loading (inline PEM or `.p8` file path)
//! - ES256 token signing with issuer/key-id claims
//! - In-memory caching with margin-based early refresh

pub mod credential;
pub mod key_source;
pub mod signer;
#[cfg(test)]
pub(crate) mod test_support;
pub mod token_cache;

pub use credential::Credential;
pub use key_source::KeySource;
pub use signer::TokenSigner;
pub use token_cache::TokenCache;
