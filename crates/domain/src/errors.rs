//! Error types used throughout the provisioning client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single error entry from a structured API error response
///
/// The provisioning API reports failures as a list of these objects under
/// an `errors` key. The full list is preserved on [`ProvisorError::Api`] so
/// callers can inspect every rejection reason, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorDetail {
    /// Whether this entry reports a rejected or expired credential
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        self.code.starts_with("NOT_AUTHORIZED")
    }
}

fn summarize(errors: &[ApiErrorDetail]) -> String {
    if errors.is_empty() {
        return "no error details provided".to_string();
    }
    errors
        .iter()
        .map(|e| match &e.detail {
            Some(detail) => format!("{}: {}", e.code, detail),
            None => e.code.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for Provisor
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProvisorError {
    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error (status {status}): {}", summarize(errors))]
    Api { status: u16, errors: Vec<ApiErrorDetail> },

    #[error("Reconcile error: {0}")]
    Reconcile(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Provisor operations
pub type Result<T> = std::result::Result<T, ProvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(code: &str, detail: Option<&str>) -> ApiErrorDetail {
        ApiErrorDetail {
            id: None,
            status: "409".to_string(),
            code: code.to_string(),
            title: None,
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn api_error_display_lists_every_entry() {
        let err = ProvisorError::Api {
            status: 409,
            errors: vec![
                detail("ENTITY_ERROR.ATTRIBUTE.INVALID", Some("name is taken")),
                detail("STATE_ERROR", None),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("status 409"));
        assert!(text.contains("ENTITY_ERROR.ATTRIBUTE.INVALID: name is taken"));
        assert!(text.contains("STATE_ERROR"));
    }

    #[test]
    fn api_error_display_with_empty_list() {
        let err = ProvisorError::Api { status: 500, errors: vec![] };
        assert!(err.to_string().contains("no error details provided"));
    }

    #[test]
    fn authorization_failure_matches_code_prefix() {
        assert!(detail("NOT_AUTHORIZED", None).is_authorization_failure());
        assert!(detail("NOT_AUTHORIZED.SESSION_EXPIRED", None).is_authorization_failure());
        assert!(!detail("FORBIDDEN_ERROR", None).is_authorization_failure());
    }
}
