//! Access scope extractor.
//!
//! The access middleware attaches an [`AccessScope`] to every request it
//! allows. Handlers take it as an argument to learn who the caller is and
//! which organization their queries must be bound to.

use axum::{extract::FromRequestParts, http::request::Parts};
use hms_access::{OrgId, OrgScope, Principal};

use crate::error::RestError;

/// The outcome of an allowed access decision.
///
/// # Example
///
/// ```rust,ignore
/// use hms_rest::extractors::AccessScope;
///
/// async fn list_patients(scope: AccessScope) {
///     let org = scope.effective_org(); // None only for the super-tier without ?orgId
///     println!("{} lists patients of {:?}", scope.principal().id, org);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    principal: Principal,
    scope: Option<OrgScope>,
    action: String,
}

impl AccessScope {
    /// Creates a scope for an allowed request.
    pub fn new(principal: Principal, scope: Option<OrgScope>, action: impl Into<String>) -> Self {
        Self {
            principal,
            scope,
            action: action.into(),
        }
    }

    /// Returns the authenticated principal.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the tenant scope, if the route enforces one.
    pub fn org_scope(&self) -> Option<&OrgScope> {
        self.scope.as_ref()
    }

    /// Returns `true` if the route enforces tenant scope.
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// Returns the organization handlers must restrict queries to.
    ///
    /// `None` on a scoped route means the super-tier requested no particular
    /// organization.
    pub fn effective_org(&self) -> Option<&OrgId> {
        self.scope.as_ref().and_then(OrgScope::effective)
    }

    /// Returns the audit action name of the matched route.
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl<S> FromRequestParts<S> for AccessScope
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessScope>()
            .cloned()
            .ok_or_else(|| RestError::InternalError {
                message: format!(
                    "no access scope for {} {}; route is not behind the access layer",
                    parts.method,
                    parts.uri.path()
                ),
            })
    }
}
