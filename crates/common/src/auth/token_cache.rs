//! In-memory token cache
//!
//! Callers never sign tokens directly; they go through the cache, which
//! hands out the current credential while it is valid and resigns when the
//! refresh margin is reached. The executor drops the cached credential via
//! `invalidate` when the server rejects a token mid-flight.

use tokio::sync::RwLock;
use tracing::debug;

use provisor_domain::Result;

use super::credential::Credential;
use super::signer::TokenSigner;

/// Caches the current signed credential and resigns on demand
///
/// Safe for concurrent use: resigning happens under a write lock, and a
/// caller that raced to the lock re-checks validity so only one fresh
/// credential is ever stored per refresh (single-writer-wins).
pub struct TokenCache {
    signer: TokenSigner,
    current: RwLock<Option<Credential>>,
}

impl TokenCache {
    /// Create an empty cache around a signer
    #[must_use]
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer, current: RwLock::new(None) }
    }

    /// Get a bearer token, resigning if absent or stale
    ///
    /// # Errors
    /// Returns `ProvisorError::Signing` if a resign is needed and fails.
    pub async fn token(&self) -> Result<String> {
        {
            let slot = self.current.read().await;
            if let Some(credential) = slot.as_ref() {
                if credential.is_valid() {
                    return Ok(credential.token().to_string());
                }
            }
        }

        self.resign().await
    }

    /// Force a resign if the cached credential is absent or stale
    ///
    /// Immediately afterwards the cached credential is valid.
    ///
    /// # Errors
    /// Returns `ProvisorError::Signing` if a resign is needed and fails.
    pub async fn ensure_valid(&self) -> Result<()> {
        self.token().await.map(|_| ())
    }

    /// Drop the cached credential
    ///
    /// The next `token` call signs a fresh one. Used when the server
    /// rejects a token that looked valid locally.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
        debug!("dropped cached connect token");
    }

    /// Current credential, if any (no resign)
    pub async fn current(&self) -> Option<Credential> {
        self.current.read().await.clone()
    }

    async fn resign(&self) -> Result<String> {
        let mut slot = self.current.write().await;

        // A racing caller may have resigned while we waited for the lock.
        if let Some(credential) = slot.as_ref() {
            if credential.is_valid() {
                return Ok(credential.token().to_string());
            }
        }

        let credential = self.signer.sign()?;
        debug!(expires_at = %credential.expires_at(), "signed fresh connect token");
        let token = credential.token().to_string();
        *slot = Some(credential);
        Ok(token)
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, credential: Credential) {
        *self.current.write().await = Some(credential);
    }
}
