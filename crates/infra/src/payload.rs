//! Profile payload inspection
//!
//! A `.mobileprovision` payload is a CMS-signed blob with an XML property
//! list embedded in it. The inspector never parses the CMS wrapper; it
//! scans the text for the few identity markers reconciliation needs. Bytes
//! outside the XML survive a lossy UTF-8 pass untouched enough for marker
//! scanning to work.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use provisor_core::{PayloadSummary, ProfilePayloadInspector};
use provisor_domain::{ProvisorError, Result};

/// Marker-scanning payload inspector
///
/// Reads the `Entitlements` dictionary for string-valued entries, derives
/// the app id from `application-identifier` with the team prefix stripped,
/// and picks up the top-level `ExpirationDate` when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistScanInspector;

impl ProfilePayloadInspector for PlistScanInspector {
    fn inspect(&self, payload: &[u8]) -> Result<PayloadSummary> {
        let text = String::from_utf8_lossy(payload);
        let entitlements = scan_entitlements(&text);

        let app_id = entitlements
            .get("application-identifier")
            .map(|identifier| strip_team_prefix(identifier).to_string())
            .ok_or_else(|| {
                ProvisorError::Transport(
                    "payload has no application-identifier entitlement".to_string(),
                )
            })?;

        let expiration_date = scan_date(&text, "ExpirationDate");
        Ok(PayloadSummary { app_id, expiration_date, entitlements })
    }
}

/// Drop the leading team id from an `application-identifier` value
///
/// `TEAM123.com.example.app` becomes `com.example.app`; a wildcard
/// `TEAM123.*` becomes `*`. A value without a dot is returned whole.
fn strip_team_prefix(identifier: &str) -> &str {
    match identifier.split_once('.') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => identifier,
    }
}

/// Collect string-valued entries of the `Entitlements` dictionary
///
/// Boolean and nested values are skipped; they carry no identity the
/// reconciler compares.
fn scan_entitlements(text: &str) -> BTreeMap<String, String> {
    let mut entitlements = BTreeMap::new();
    let Some(marker) = text.find("<key>Entitlements</key>") else {
        return entitlements;
    };
    let Some(body) = dict_body(&text[marker..]) else {
        return entitlements;
    };

    let mut rest = body;
    while let Some(start) = rest.find("<key>") {
        let after_key = &rest[start + "<key>".len()..];
        let Some(end) = after_key.find("</key>") else {
            break;
        };
        let key = &after_key[..end];
        let tail = &after_key[end + "</key>".len()..];

        if let Some(after_open) = tail.trim_start().strip_prefix("<string>") {
            if let Some(value_end) = after_open.find("</string>") {
                entitlements.insert(key.to_string(), after_open[..value_end].to_string());
            }
        }
        rest = tail;
    }
    entitlements
}

/// Inner text of the first `<dict>` element, honoring nesting
fn dict_body(text: &str) -> Option<&str> {
    let open = text.find("<dict>")?;
    let body_start = open + "<dict>".len();
    let mut depth = 1usize;
    let mut cursor = body_start;

    loop {
        let rest = &text[cursor..];
        let next_close = rest.find("</dict>")?;
        match rest.find("<dict>") {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                cursor += next_open + "<dict>".len();
            }
            _ => {
                depth -= 1;
                cursor += next_close + "</dict>".len();
                if depth == 0 {
                    return Some(&text[body_start..cursor - "</dict>".len()]);
                }
            }
        }
    }
}

/// Parse the `<date>` value following a top-level key, if present
fn scan_date(text: &str, key: &str) -> Option<DateTime<Utc>> {
    let marker = format!("<key>{key}</key>");
    let tail = &text[text.find(&marker)? + marker.len()..];
    let start = tail.find("<date>")?;
    let after = &tail[start + "<date>".len()..];
    let end = after.find("</date>")?;

    DateTime::parse_from_rfc3339(after[..end].trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
