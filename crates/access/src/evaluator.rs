//! The authorization evaluator.
//!
//! Pure decision functions over a [`Principal`] and the [`PermissionCatalog`].
//! Every check treats a missing principal as [`AccessError::Unauthenticated`]
//! before looking at roles.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{AccessError, Decision};
use crate::permission::{PermissionCatalog, PermissionGroup, RoleSet};
use crate::principal::Principal;
use crate::role::Role;

/// Evaluates role and permission requirements against a catalog.
///
/// The catalog is injected so tests and alternate deployments can supply
/// their own.
#[derive(Debug, Clone)]
pub struct Authorizer {
    catalog: Arc<PermissionCatalog>,
}

impl Authorizer {
    /// Creates an evaluator over `catalog`.
    pub fn new(catalog: Arc<PermissionCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the catalog this evaluator resolves groups against.
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Allows iff the principal's role is in `allowed`.
    pub fn require_any_role(&self, principal: Option<&Principal>, allowed: &RoleSet) -> Decision {
        require_any_role(principal, allowed)
    }

    /// Resolves `group` and behaves as [`require_any_role`](Self::require_any_role).
    ///
    /// An unknown group is a configuration fault regardless of the caller.
    pub fn require_permission(&self, principal: Option<&Principal>, group: &str) -> Decision {
        require_permission(&self.catalog, principal, group)
    }

    /// Same as [`require_permission`](Self::require_permission) for a compile-time group.
    pub fn require_group(&self, principal: Option<&Principal>, group: PermissionGroup) -> Decision {
        require_permission(&self.catalog, principal, group.name())
    }

    /// Allows only the super-tier.
    pub fn require_super_tier(&self, principal: Option<&Principal>) -> Decision {
        require_super_tier(principal)
    }

    /// Allows either administrative tier.
    pub fn require_admin_tier(&self, principal: Option<&Principal>) -> Decision {
        require_admin_tier(principal)
    }

    /// Allows administrative tiers, or the owner of the resource.
    pub fn require_owner_or_admin_tier(
        &self,
        principal: Option<&Principal>,
        owner_id: Option<&str>,
    ) -> Decision {
        require_owner_or_admin_tier(principal, owner_id)
    }
}

fn authenticated(principal: Option<&Principal>) -> Result<&Principal, AccessError> {
    principal.ok_or(AccessError::Unauthenticated)
}

/// Allows iff the principal's role is in `allowed`.
pub fn require_any_role(principal: Option<&Principal>, allowed: &RoleSet) -> Decision {
    let principal = authenticated(principal)?;
    if allowed.contains(principal.role) {
        return Ok(());
    }

    debug!(
        user_id = %principal.id,
        role = %principal.role,
        "role not in allowed set"
    );
    Err(AccessError::InsufficientRole {
        required_roles: allowed.to_vec(),
        user_role: principal.role,
    })
}

/// Resolves `group` in `catalog` and checks the principal's role against it.
pub fn require_permission(
    catalog: &PermissionCatalog,
    principal: Option<&Principal>,
    group: &str,
) -> Decision {
    let allowed = catalog.resolve(group).inspect_err(|_| {
        error!(group = %group, "Invalid permission group");
    })?;
    require_any_role(principal, allowed)
}

/// Allows only the super-tier.
pub fn require_super_tier(principal: Option<&Principal>) -> Decision {
    let principal = authenticated(principal)?;
    if principal.role.is_super_tier() {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole {
            required_roles: vec![Role::SuperAdmin],
            user_role: principal.role,
        })
    }
}

/// Allows either administrative tier.
pub fn require_admin_tier(principal: Option<&Principal>) -> Decision {
    let principal = authenticated(principal)?;
    if principal.role.is_admin_tier() {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole {
            required_roles: PermissionGroup::Admins.members().to_vec(),
            user_role: principal.role,
        })
    }
}

/// Allows administrative tiers, or a principal whose id equals `owner_id`.
///
/// A missing owner id never matches.
pub fn require_owner_or_admin_tier(principal: Option<&Principal>, owner_id: Option<&str>) -> Decision {
    let principal = authenticated(principal)?;
    if principal.role.is_admin_tier() || owner_id == Some(principal.id.as_str()) {
        Ok(())
    } else {
        Err(AccessError::NotResourceOwner)
    }
}
