//! Whole-list snapshot cache
//!
//! The resource repository lists directory collections (devices,
//! certificates, profiles) that change rarely and are always consumed
//! whole. This cache stores one fetched list per resource kind for the
//! lifetime of the process; there is no TTL, only explicit invalidation
//! and targeted updates after mutations.

use std::future::Future;

use tokio::sync::RwLock;

use provisor_domain::Result;

/// Caches one fetched list until invalidated
///
/// `get_or_fetch` re-checks under the write lock, so concurrent first
/// readers trigger a single fetch and share its result.
pub struct ListCache<T> {
    entries: RwLock<Option<Vec<T>>>,
}

impl<T: Clone> ListCache<T> {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(None) }
    }

    /// Return the cached list, fetching it on first use
    ///
    /// The fetch runs under the write lock: a caller that raced to the lock
    /// finds the list already present and never fetches again.
    ///
    /// # Errors
    /// Propagates the fetch error; the cache stays empty so the next call
    /// retries.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(list) = entries.as_ref() {
                return Ok(list.clone());
            }
        }

        let mut slot = self.entries.write().await;
        if let Some(list) = slot.as_ref() {
            return Ok(list.clone());
        }

        let fetched = fetch().await?;
        *slot = Some(fetched.clone());
        Ok(fetched)
    }

    /// Store a list, replacing whatever was cached
    pub async fn replace(&self, entries: Vec<T>) {
        *self.entries.write().await = Some(entries);
    }

    /// Mutate the cached list in place
    ///
    /// Returns `false` without calling `mutate` when nothing is cached yet;
    /// an empty cache has nothing to keep consistent.
    pub async fn update<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Vec<T>),
    {
        let mut slot = self.entries.write().await;
        match slot.as_mut() {
            Some(list) => {
                mutate(list);
                true
            }
            None => false,
        }
    }

    /// Drop the cached list; the next `get_or_fetch` fetches again
    pub async fn invalidate(&self) {
        *self.entries.write().await = None;
    }

    /// Snapshot of the cached list, if any (no fetch)
    pub async fn cached(&self) -> Option<Vec<T>> {
        self.entries.read().await.clone()
    }
}

impl<T: Clone> Default for ListCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
