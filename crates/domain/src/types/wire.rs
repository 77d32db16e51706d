//! Wire envelope for the provisioning API
//!
//! The API wraps resources in `{ "data": ... }` documents. Collections add a
//! `links` object whose `next` member carries the absolute URL of the
//! following page; error responses carry a list under `errors` instead.

use serde::{Deserialize, Serialize};

use crate::errors::ApiErrorDetail;

/// One resource as it appears on the wire
///
/// Attributes stay untyped here; each record type decodes them fail-fast in
/// its `from_object` constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// Single-resource response document
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub data: Option<ResourceObject>,
}

/// Pagination links attached to a collection document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub this: Option<String>,
    pub next: Option<String>,
}

/// Collection response document
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    pub data: Vec<ResourceObject>,
    #[serde(default)]
    pub links: PageLinks,
}

/// Error response document
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ApiErrorDetail>,
}

/// Reference to an existing resource inside a creation request
#[derive(Debug, Clone, Serialize)]
pub struct ResourceLinkage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// To-one relationship payload
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub data: ResourceLinkage,
}

/// To-many relationship payload
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipList {
    pub data: Vec<ResourceLinkage>,
}

/// Request document wrapping a creation payload
#[derive(Debug, Clone, Serialize)]
pub struct CreationDocument<T> {
    pub data: T,
}
