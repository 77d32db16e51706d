//! Retry classification for structured API errors
//!
//! The executor handles transport failures itself; structured error bodies
//! are handed to a [`RetryPolicy`], which maps each `(status, error)` pair
//! to a directive. The standard policy retries nothing except the single
//! forced resign on a rejected token.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use provisor_domain::constants::{DEFAULT_BASE_BACKOFF_MS, DEFAULT_RETRY_BUDGET};
use provisor_domain::ApiErrorDetail;

/// What to do with a structured API error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDirective {
    /// Sleep the backoff and send the request again
    Retry,

    /// Invalidate the cached token, resign, and send again (at most once
    /// per logical call)
    RefreshAuth,

    /// Surface the error to the caller
    Fail,
}

type Classifier = dyn Fn(u16, &ApiErrorDetail) -> RetryDirective + Send + Sync;

/// Maps structured API errors to retry directives
///
/// `max_retries` bounds retries of retryable failures: a budget of 2 means
/// one original attempt plus up to two retries. Backoff is exponential from
/// `base_backoff`.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_backoff: Duration,
    classifier: Arc<Classifier>,
}

impl RetryPolicy {
    /// The standard policy: nothing retries except a rejected token
    ///
    /// HTTP 401 with an authorization error code triggers a forced resign;
    /// every other structured error is surfaced immediately.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            max_retries: DEFAULT_RETRY_BUDGET,
            base_backoff: Duration::from_millis(DEFAULT_BASE_BACKOFF_MS),
            classifier: Arc::new(|status, error| {
                if status == 401 && error.is_authorization_failure() {
                    RetryDirective::RefreshAuth
                } else {
                    RetryDirective::Fail
                }
            }),
        }
    }

    /// Override the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the base backoff
    #[must_use]
    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    /// Replace the classifier
    #[must_use]
    pub fn with_classifier(
        mut self,
        classifier: impl Fn(u16, &ApiErrorDetail) -> RetryDirective + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// The retry budget (retries, not counting the original attempt)
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff before the given retry (1-based)
    ///
    /// Doubles per retry: base, 2x base, 4x base. The exponent is capped so
    /// a misconfigured budget cannot overflow the multiplier.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        self.base_backoff.saturating_mul(1 << exponent)
    }

    /// Classify a structured error response
    ///
    /// Scans the error list in order; the first entry that yields a
    /// non-`Fail` directive wins. An empty list fails.
    #[must_use]
    pub fn decide(&self, status: u16, errors: &[ApiErrorDetail]) -> RetryDirective {
        errors
            .iter()
            .map(|error| (self.classifier)(status, error))
            .find(|directive| *directive != RetryDirective::Fail)
            .unwrap_or(RetryDirective::Fail)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_backoff", &self.base_backoff)
            .finish_non_exhaustive()
    }
}
