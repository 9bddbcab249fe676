//! Composition of access rules.
//!
//! An [`AccessChain`] runs a list of [`AccessRule`]s against one
//! [`AccessRequest`] and stops at the first denial or fault. Rules in the
//! [`Phase::Authorize`] phase always run before [`Phase::Scope`] rules, so a
//! caller lacking the capability is rejected before any organization check
//! can reveal anything about the requested organization.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use hms_access::{AccessChain, AccessRequest, OrgId, PermissionCatalog, Principal, Role};
//! use hms_access::chain::{Permission, TenantScope};
//!
//! let catalog = PermissionCatalog::standard();
//! let chain = AccessChain::new(vec![
//!     Arc::new(TenantScope),
//!     Arc::new(Permission::new("LAB_PROCESS")),
//! ]);
//!
//! let request = AccessRequest::new(Some(Principal::new("u42", Role::Nurse, "org-1")));
//! let grant = chain.evaluate(&catalog, &request).unwrap();
//! assert_eq!(grant.effective_org(), Some(&OrgId::new("org-1")));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AccessError, Decision};
use crate::evaluator;
use crate::org::OrgId;
use crate::permission::{PermissionCatalog, RoleSet};
use crate::principal::Principal;
use crate::scope::{OrgScope, enforce_scope};

/// HTTP-free view of a request, as seen by access rules.
#[derive(Debug, Clone, Default)]
pub struct AccessRequest {
    /// The authenticated principal, if any.
    pub principal: Option<Principal>,
    /// The organization the caller asked for, if any.
    pub requested_org: Option<OrgId>,
    /// Organization ids named by lower-priority request sources. A
    /// tenant-bound principal must own every one of them.
    pub other_orgs: Vec<OrgId>,
    /// Request path, for audit records.
    pub path: String,
    /// Path parameters of the matched route.
    pub params: HashMap<String, String>,
}

impl AccessRequest {
    /// Creates a request with no requested organization.
    pub fn new(principal: Option<Principal>) -> Self {
        Self {
            principal,
            ..Default::default()
        }
    }

    /// Sets the requested organization.
    pub fn with_requested_org(mut self, org: impl Into<OrgId>) -> Self {
        self.requested_org = Some(org.into());
        self
    }

    /// Adds an organization id named by a lower-priority source.
    pub fn with_other_org(mut self, org: impl Into<OrgId>) -> Self {
        self.other_orgs.push(org.into());
        self
    }

    /// Sets the request path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Adds a path parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns the principal, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns a path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What a rule sees while it runs.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// The catalog permission groups resolve against.
    pub catalog: &'a PermissionCatalog,
    /// The request being decided.
    pub request: &'a AccessRequest,
}

/// Accumulated result of a successful chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grant {
    scope: Option<OrgScope>,
}

impl Grant {
    /// Records the organization scope computed by a scope rule.
    pub fn set_scope(&mut self, scope: OrgScope) {
        self.scope = Some(scope);
    }

    /// Returns the scope, if a scope rule ran.
    pub fn scope(&self) -> Option<&OrgScope> {
        self.scope.as_ref()
    }

    /// Returns `true` if a scope rule ran.
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// Returns the effective organization id, if the chain was scoped and the
    /// scope is bound to one organization.
    pub fn effective_org(&self) -> Option<&OrgId> {
        self.scope.as_ref().and_then(OrgScope::effective)
    }
}

/// Evaluation phase of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Role and permission checks.
    Authorize,
    /// Tenant scope enforcement.
    Scope,
}

/// One step of an access decision.
pub trait AccessRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The phase this rule belongs to.
    fn phase(&self) -> Phase {
        Phase::Authorize
    }

    /// Decides the request, optionally recording data in `grant`.
    fn evaluate(&self, ctx: &EvalContext<'_>, grant: &mut Grant) -> Decision;
}

/// Requires the principal's role to be in a fixed set.
#[derive(Debug, Clone)]
pub struct AnyRole(pub RoleSet);

impl AccessRule for AnyRole {
    fn name(&self) -> &str {
        "require_any_role"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, _grant: &mut Grant) -> Decision {
        evaluator::require_any_role(ctx.request.principal(), &self.0)
    }
}

/// Requires membership in a named permission group.
#[derive(Debug, Clone)]
pub struct Permission {
    group: String,
}

impl Permission {
    /// Creates a rule for the group named `group`.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    /// Returns the group name.
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl AccessRule for Permission {
    fn name(&self) -> &str {
        "require_permission"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, _grant: &mut Grant) -> Decision {
        evaluator::require_permission(ctx.catalog, ctx.request.principal(), &self.group)
    }
}

/// Requires the super-tier.
#[derive(Debug, Clone, Copy)]
pub struct SuperTier;

impl AccessRule for SuperTier {
    fn name(&self) -> &str {
        "require_super_tier"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, _grant: &mut Grant) -> Decision {
        evaluator::require_super_tier(ctx.request.principal())
    }
}

/// Requires either administrative tier.
#[derive(Debug, Clone, Copy)]
pub struct AdminTier;

impl AccessRule for AdminTier {
    fn name(&self) -> &str {
        "require_admin_tier"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, _grant: &mut Grant) -> Decision {
        evaluator::require_admin_tier(ctx.request.principal())
    }
}

type OwnerFn = dyn Fn(&Principal, &AccessRequest) -> Option<String> + Send + Sync;

/// Allows administrative tiers, or the owner of the addressed resource.
#[derive(Clone)]
pub struct OwnerOrAdminTier {
    owner_of: Arc<OwnerFn>,
}

impl OwnerOrAdminTier {
    /// Creates a rule whose owner id is computed by `owner_of`.
    pub fn new<F>(owner_of: F) -> Self
    where
        F: Fn(&Principal, &AccessRequest) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            owner_of: Arc::new(owner_of),
        }
    }

    /// Creates a rule that reads the owner id from a path parameter.
    pub fn path_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |_, request| request.param(&name).map(str::to_string))
    }
}

impl fmt::Debug for OwnerOrAdminTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerOrAdminTier").finish_non_exhaustive()
    }
}

impl AccessRule for OwnerOrAdminTier {
    fn name(&self) -> &str {
        "require_owner_or_admin_tier"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, _grant: &mut Grant) -> Decision {
        let principal = ctx.request.principal();
        let owner = principal.and_then(|p| (self.owner_of)(p, ctx.request));
        evaluator::require_owner_or_admin_tier(principal, owner.as_deref())
    }
}

/// Enforces tenant scope and records the effective organization.
#[derive(Debug, Clone, Copy)]
pub struct TenantScope;

impl AccessRule for TenantScope {
    fn name(&self) -> &str {
        "enforce_scope"
    }

    fn phase(&self) -> Phase {
        Phase::Scope
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, grant: &mut Grant) -> Decision {
        let principal = ctx.request.principal();
        let scope = enforce_scope(principal, ctx.request.requested_org.as_ref())?;
        // Agnostic principals pass every check here; the rest may not name
        // another organization anywhere in the request.
        for other in &ctx.request.other_orgs {
            enforce_scope(principal, Some(other))?;
        }
        grant.set_scope(scope);
        Ok(())
    }
}

/// An ordered, short-circuiting list of rules.
#[derive(Clone, Default)]
pub struct AccessChain {
    rules: Vec<Arc<dyn AccessRule>>,
}

impl AccessChain {
    /// Creates a chain. Authorization rules are moved ahead of scope rules;
    /// order within a phase is kept.
    pub fn new(mut rules: Vec<Arc<dyn AccessRule>>) -> Self {
        rules.sort_by_key(|rule| rule.phase());
        Self { rules }
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[Arc<dyn AccessRule>] {
        &self.rules
    }

    /// Returns `true` if the chain contains a scope rule.
    pub fn is_scoped(&self) -> bool {
        self.rules.iter().any(|rule| rule.phase() == Phase::Scope)
    }

    /// Runs every rule in order, stopping at the first failure.
    pub fn evaluate(
        &self,
        catalog: &PermissionCatalog,
        request: &AccessRequest,
    ) -> Result<Grant, AccessError> {
        let mut grant = Grant::default();
        self.evaluate_phase(Phase::Authorize, catalog, request, &mut grant)?;
        self.evaluate_phase(Phase::Scope, catalog, request, &mut grant)?;
        Ok(grant)
    }

    /// Runs only the rules of one phase, in order, stopping at the first
    /// failure.
    ///
    /// Lets a caller settle authorization before reading anything the scope
    /// phase needs, such as a request body.
    pub fn evaluate_phase(
        &self,
        phase: Phase,
        catalog: &PermissionCatalog,
        request: &AccessRequest,
        grant: &mut Grant,
    ) -> Decision {
        let ctx = EvalContext { catalog, request };
        self.rules
            .iter()
            .filter(|rule| rule.phase() == phase)
            .try_for_each(|rule| rule.evaluate(&ctx, grant))
    }
}

impl fmt::Debug for AccessChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

/// Builds a chain from rules. See [`AccessChain::new`].
pub fn chain(rules: Vec<Arc<dyn AccessRule>>) -> AccessChain {
    AccessChain::new(rules)
}
