//! Signed credential with expiry tracking
//!
//! A `Credential` pairs a signed bearer token with its validity window. The
//! window carries a refresh margin: a token close to expiry is treated as
//! already invalid so it never goes stale mid-request.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use provisor_domain::constants::{
    LONG_WINDOW_MARGIN_SECS, MARGIN_STEP_SECS, SHORT_WINDOW_MARGIN_SECS,
};

/// A signed bearer token and its validity window
///
/// The token text is wrapped in `SecretString` so it never shows up in debug
/// or log output.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential from a signed token and its window
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self { token: SecretString::new(token.into()), issued_at, expires_at }
    }

    /// The bearer token text
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// When the token was signed
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the server stops accepting the token
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is still usable right now
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whether the token is usable at the given instant
    ///
    /// Valid means strictly before `expires_at` minus the refresh margin:
    /// 30 seconds for windows of three minutes or less, 60 seconds for
    /// longer windows.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - self.refresh_margin()
    }

    fn refresh_margin(&self) -> Duration {
        let window = self.expires_at - self.issued_at;
        if window.num_seconds() <= MARGIN_STEP_SECS {
            Duration::seconds(SHORT_WINDOW_MARGIN_SECS)
        } else {
            Duration::seconds(LONG_WINDOW_MARGIN_SECS)
        }
    }
}
