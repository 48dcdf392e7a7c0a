//! Request context types.
//!
//! The [`RequestContext`] carries everything the pipeline may read about one
//! inbound request. The transport layer builds it, the authentication layer
//! may attach a [`Principal`], and from then on the pipeline only reads it.

use crate::principal::Principal;
use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
///
/// # Example
///
/// ```
/// use palisade_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context consumed by the pipeline.
///
/// A context belongs to exactly one in-flight request. The executor takes it
/// by value, so it can never be observed by two pipeline executions at once.
///
/// Header names are stored lower-cased and looked up case-insensitively.
/// Query parameters are multi-valued, in the order they were supplied.
///
/// # Example
///
/// ```
/// use palisade_core::{Principal, RequestContext};
///
/// let mut ctx = RequestContext::new("GET", "/cats/42")
///     .with_header("Authorization", "Bearer abc")
///     .with_route_param("id", "42")
///     .with_query("name", " Tom ");
/// ctx.attach_principal(Principal::new("u-1").with_role("admin"));
///
/// assert_eq!(ctx.header("authorization"), Some("Bearer abc"));
/// assert_eq!(ctx.route_param("id"), Some("42"));
/// assert!(ctx.principal().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: String,
    path: String,
    headers: HashMap<String, String>,
    query: HashMap<String, Vec<String>>,
    route_params: HashMap<String, String>,
    body: Value,
    principal: Option<Principal>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for `method` and `path` with a fresh request ID.
    ///
    /// The method is normalized to upper case.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_request_id(RequestId::new(), method, path)
    }

    /// Creates a context with a caller-supplied request ID.
    #[must_use]
    pub fn with_request_id(
        request_id: RequestId,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            route_params: HashMap::new(),
            body: Value::Null,
            principal: None,
            started_at: Instant::now(),
        }
    }

    /// Adds a header. Later values for the same name replace earlier ones.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Appends a query parameter value.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Adds a route parameter.
    #[must_use]
    pub fn with_route_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Returns a context with the principal attached.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Attaches the authenticated principal.
    ///
    /// Only the authentication layer calls this, before the pipeline runs.
    pub fn attach_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the upper-cased request method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns all headers, keyed by lower-cased name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns every value supplied for a query parameter.
    #[must_use]
    pub fn query_values(&self, name: &str) -> Option<&[String]> {
        self.query.get(name).map(Vec::as_slice)
    }

    /// Returns the full query parameter map.
    #[must_use]
    pub fn query(&self) -> &HashMap<String, Vec<String>> {
        &self.query
    }

    /// Looks up a route parameter.
    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params.get(name).map(String::as_str)
    }

    /// Returns the full route parameter map.
    #[must_use]
    pub fn route_params(&self) -> &HashMap<String, String> {
        &self.route_params
    }

    /// Returns the request body, or `Value::Null` if none was supplied.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the attached principal, if the caller was authenticated.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_serializes_transparently() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_method_is_upper_cased() {
        let ctx = RequestContext::new("get", "/cats");
        assert_eq!(ctx.method(), "GET");
        assert_eq!(ctx.path(), "/cats");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let ctx = RequestContext::new("GET", "/").with_header("X-Api-Key", "k1");
        assert_eq!(ctx.header("x-api-key"), Some("k1"));
        assert_eq!(ctx.header("X-API-KEY"), Some("k1"));
        assert_eq!(ctx.header("missing"), None);
    }

    #[test]
    fn test_query_is_multi_valued() {
        let ctx = RequestContext::new("GET", "/")
            .with_query("id", "1")
            .with_query("id", "2");
        assert_eq!(
            ctx.query_values("id"),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert!(ctx.query_values("other").is_none());
    }

    #[test]
    fn test_body_defaults_to_null() {
        let ctx = RequestContext::new("POST", "/cats");
        assert!(ctx.body().is_null());

        let ctx = ctx.with_body(serde_json::json!({"name": "Tom"}));
        assert_eq!(ctx.body()["name"], "Tom");
    }

    #[test]
    fn test_attach_principal() {
        let mut ctx = RequestContext::new("GET", "/");
        assert!(ctx.principal().is_none());

        ctx.attach_principal(Principal::new("u-1"));
        assert_eq!(ctx.principal().map(Principal::id), Some("u-1"));
    }
}
