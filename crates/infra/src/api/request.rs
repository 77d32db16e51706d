//! Immutable request descriptions
//!
//! A descriptor captures one API call: method, versioned path, query
//! parameters, and an optional JSON body. Descriptors carry no transport
//! state, so a retry loop can replay one as often as the policy allows.

use reqwest::Method;

/// One API request, described before it is sent
///
/// Query conventions follow the provisioning API: `limit=<n>` for page
/// size, `filter[<field>]=<value>` for server-side filters, and
/// `fields[<type>]=<comma-list>` for sparse attribute sets.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,

    /// Path below the API base URL, with a leading slash (`/profiles`)
    pub path: String,

    /// Query parameters appended in order
    pub query: Vec<(String, String)>,

    /// JSON body for mutating requests
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    /// Describe a GET request
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), query: Vec::new(), body: None }
    }

    /// Describe a POST request with a JSON body
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::POST, path: path.into(), query: Vec::new(), body: Some(body) }
    }

    /// Describe a DELETE request
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self { method: Method::DELETE, path: path.into(), query: Vec::new(), body: None }
    }

    /// Append a raw query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a `filter[<field>]=<value>` parameter
    #[must_use]
    pub fn with_filter(self, field: &str, value: impl Into<String>) -> Self {
        self.with_query(format!("filter[{field}]"), value)
    }

    /// Append a `fields[<type>]=<comma-list>` parameter
    #[must_use]
    pub fn with_fields(self, resource: &str, names: &[&str]) -> Self {
        self.with_query(format!("fields[{resource}]"), names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_method_and_path() {
        let get = RequestDescriptor::get("/devices");
        assert_eq!(get.method, Method::GET);
        assert_eq!(get.path, "/devices");
        assert!(get.query.is_empty());
        assert!(get.body.is_none());

        let delete = RequestDescriptor::delete("/profiles/prof-1");
        assert_eq!(delete.method, Method::DELETE);

        let post = RequestDescriptor::post("/devices", serde_json::json!({"data": {}}));
        assert_eq!(post.method, Method::POST);
        assert!(post.body.is_some());
    }

    #[test]
    fn query_helpers_follow_api_conventions() {
        let request = RequestDescriptor::get("/certificates")
            .with_filter("certificateType", "DEVELOPMENT")
            .with_fields("certificates", &["name", "certificateType"])
            .with_query("limit", "10");

        assert_eq!(
            request.query,
            vec![
                ("filter[certificateType]".to_string(), "DEVELOPMENT".to_string()),
                ("fields[certificates]".to_string(), "name,certificateType".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
