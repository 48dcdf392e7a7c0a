//! Role requirement guard.

use std::collections::BTreeSet;
use std::future::ready;

use palisade_core::{PipelineError, PipelineResult, Principal};

use super::UNAUTHORIZED_MESSAGE;
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::interceptor::BoxFuture;

/// Enforces the handler's required-role set.
///
/// - Empty set: always admits, with or without a principal.
/// - Non-empty set, no principal: authentication error.
/// - Non-empty set: admits if the principal holds any required role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolesGuard;

impl RolesGuard {
    /// Checks `principal` against `required`.
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use palisade_core::Principal;
    /// use palisade_pipeline::guards::RolesGuard;
    ///
    /// let required: BTreeSet<String> = ["admin".to_string()].into();
    /// let admin = Principal::new("a").with_role("admin");
    /// assert!(RolesGuard::check(&required, Some(&admin)).unwrap());
    /// assert!(RolesGuard::check(&BTreeSet::new(), None).unwrap());
    /// ```
    pub fn check(required: &BTreeSet<String>, principal: Option<&Principal>) -> PipelineResult<bool> {
        if required.is_empty() {
            return Ok(true);
        }

        match principal {
            Some(principal) => Ok(principal.has_any_role(required)),
            None => Err(PipelineError::authentication(UNAUTHORIZED_MESSAGE)),
        }
    }
}

impl Guard for RolesGuard {
    fn name(&self) -> &'static str {
        "roles"
    }

    fn can_activate<'a>(&'a self, ctx: &'a ExecutionContext) -> BoxFuture<'a, PipelineResult<bool>> {
        Box::pin(ready(Self::check(
            ctx.descriptor().required_roles(),
            ctx.principal(),
        )))
    }
}
