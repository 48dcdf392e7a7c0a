//! The authenticated caller.
//!
//! A [`Principal`] is attached to a [`RequestContext`](crate::RequestContext)
//! by the authentication layer. Its absence means "unauthenticated".

use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An authenticated caller with a role set and free-form claims.
///
/// # Example
///
/// ```
/// use palisade_core::Principal;
///
/// let principal = Principal::new("u-7")
///     .with_roles(["admin", "user"])
///     .with_claim("email", "alice@example.com");
///
/// assert!(principal.has_role("admin"));
/// assert_eq!(principal.field("email").unwrap(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: String,
    #[serde(default)]
    roles: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty", flatten)]
    claims: serde_json::Map<String, Value>,
}

impl Principal {
    /// Creates a principal with no roles and no claims.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
            claims: serde_json::Map::new(),
        }
    }

    /// Adds a single role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds several roles.
    #[must_use]
    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Adds a claim. The keys `id` and `roles` are reserved and shadowed by
    /// the principal's own fields in [`field`](Self::field).
    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    /// Returns the principal's identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the role set.
    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Returns `true` if the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the principal holds at least one of `required`.
    #[must_use]
    pub fn has_any_role<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        required.into_iter().any(|role| self.roles.contains(role))
    }

    /// Looks up a single field: `id`, `roles`, or a claim key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "roles" => Some(Value::Array(
                self.roles.iter().cloned().map(Value::String).collect(),
            )),
            other => self.claims.get(other).cloned(),
        }
    }

    /// Returns the whole principal as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.claims.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert(
            "roles".to_string(),
            Value::Array(self.roles.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }

    /// Returns an identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("principal:{}", self.id)
    }
}
