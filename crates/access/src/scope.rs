//! Tenant scope enforcement.
//!
//! [`enforce_scope`] decides whether a principal may touch data of the
//! requested organization and computes the *effective* organization id. The
//! effective id is the only organization a handler may use to filter or tag
//! data; a client-supplied id is never trusted directly.
//!
//! # Rules
//!
//! 1. No principal: deny, authentication required.
//! 2. Organization-agnostic role (the super-tier): allow, effective id is the
//!    requested id, which may be absent (unscoped).
//! 3. Principal without an organization: deny, no organization assigned.
//! 4. Requested id present and different from the principal's: deny,
//!    cross-tenant access.
//! 5. Otherwise allow, effective id is the principal's organization.

use serde::Serialize;
use tracing::debug;

use crate::error::AccessError;
use crate::org::OrgId;
use crate::principal::Principal;

/// The organization a request is allowed to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgScope {
    effective_org_id: Option<OrgId>,
}

impl OrgScope {
    /// A scope bound to one organization.
    pub fn bound(org: OrgId) -> Self {
        Self {
            effective_org_id: Some(org),
        }
    }

    /// A scope spanning every organization (super-tier without a requested id).
    pub fn unscoped() -> Self {
        Self {
            effective_org_id: None,
        }
    }

    /// Returns the effective organization id, `None` when unscoped.
    pub fn effective(&self) -> Option<&OrgId> {
        self.effective_org_id.as_ref()
    }

    /// Returns `true` if the scope spans every organization.
    pub fn is_unscoped(&self) -> bool {
        self.effective_org_id.is_none()
    }

    /// Consumes the scope and returns the effective id.
    pub fn into_effective(self) -> Option<OrgId> {
        self.effective_org_id
    }
}

/// Applies the tenant rules to a principal and a requested organization.
///
/// Pure: the same inputs always give the same decision and effective id.
pub fn enforce_scope(
    principal: Option<&Principal>,
    requested: Option<&OrgId>,
) -> Result<OrgScope, AccessError> {
    let principal = principal.ok_or(AccessError::Unauthenticated)?;

    if principal.role.is_organization_agnostic() {
        return Ok(OrgScope {
            effective_org_id: requested.cloned(),
        });
    }

    let Some(own_org) = principal.organization_id() else {
        debug!(user_id = %principal.id, role = %principal.role, "principal has no organization");
        return Err(AccessError::NoOrganizationAssigned);
    };

    if let Some(requested) = requested {
        if requested != own_org {
            debug!(
                user_id = %principal.id,
                user_org_id = %own_org,
                requested_org_id = %requested,
                "cross-tenant request rejected"
            );
            return Err(AccessError::CrossTenantAccess {
                user_org_id: own_org.clone(),
                requested_org_id: requested.clone(),
            });
        }
    }

    Ok(OrgScope::bound(own_org.clone()))
}

/// Returns the organization a query should run against, without enforcing.
///
/// The super-tier gets the requested id when one is given; everyone else gets
/// their own organization. Prefer [`enforce_scope`] on request paths.
pub fn effective_org_id(principal: Option<&Principal>, requested: Option<&OrgId>) -> Option<OrgId> {
    let principal = principal?;
    match requested {
        Some(requested) if principal.role.is_organization_agnostic() => Some(requested.clone()),
        _ => principal.organization_id.clone(),
    }
}
