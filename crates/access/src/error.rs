//! Access decision failures.
//!
//! Every evaluator returns either an allow value or an [`AccessError`]. The
//! variants split into two classes:
//!
//! | Variant | Class | HTTP |
//! |---------|-------|------|
//! | `Unauthenticated` | client | 401 |
//! | `InsufficientRole` | client | 403 |
//! | `NotResourceOwner` | client | 403 |
//! | `NoOrganizationAssigned` | client | 403 |
//! | `CrossTenantAccess` | client | 403 |
//! | `UnknownPermissionGroup` | server fault | 500 |
//!
//! Decisions are deterministic, so none of these are retried.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::org::OrgId;
use crate::role::Role;

/// Result of an authorization check.
pub type Decision = Result<(), AccessError>;

/// A denied or faulted access decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No principal is attached to the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal's role is not in the allowed set.
    #[error("Access denied. Insufficient permissions.")]
    InsufficientRole {
        /// Roles the check accepted, in listing order.
        required_roles: Vec<Role>,
        /// The caller's role.
        user_role: Role,
    },

    /// The principal neither owns the resource nor holds an admin tier.
    #[error("Access denied. Can only access your own resources.")]
    NotResourceOwner,

    /// A tenant-scoped principal has no organization on its user record.
    #[error("User has no organization assigned")]
    NoOrganizationAssigned,

    /// The request names an organization other than the principal's own.
    #[error("Access denied. Cannot access other organizations.")]
    CrossTenantAccess {
        /// The principal's own organization.
        user_org_id: OrgId,
        /// The organization the request named.
        requested_org_id: OrgId,
    },

    /// A permission group name does not resolve. This is a deployment defect.
    #[error("invalid permission group: {group}")]
    UnknownPermissionGroup {
        /// The name that failed to resolve.
        group: String,
    },
}

impl AccessError {
    /// Returns `true` for server-class faults (configuration defects).
    pub fn is_server_fault(&self) -> bool {
        matches!(self, AccessError::UnknownPermissionGroup { .. })
    }

    /// Returns the HTTP status code this failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            AccessError::InsufficientRole { .. }
            | AccessError::NotResourceOwner
            | AccessError::NoOrganizationAssigned
            | AccessError::CrossTenantAccess { .. } => 403,
            AccessError::UnknownPermissionGroup { .. } => 500,
        }
    }

    /// Returns a short machine-readable label, used in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "unauthenticated",
            AccessError::InsufficientRole { .. } => "insufficient_role",
            AccessError::NotResourceOwner => "not_resource_owner",
            AccessError::NoOrganizationAssigned => "no_organization_assigned",
            AccessError::CrossTenantAccess { .. } => "cross_tenant_access",
            AccessError::UnknownPermissionGroup { .. } => "unknown_permission_group",
        }
    }

    /// Returns the diagnostic fields exposed to clients alongside the message.
    ///
    /// Roles and organization ids are not secrets. Server faults expose
    /// nothing: the group name is only logged.
    pub fn diagnostics(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            AccessError::InsufficientRole {
                required_roles,
                user_role,
            } => {
                fields.insert("requiredRoles".into(), json!(required_roles));
                fields.insert("userRole".into(), json!(user_role));
            }
            AccessError::CrossTenantAccess {
                user_org_id,
                requested_org_id,
            } => {
                fields.insert("userOrgId".into(), json!(user_org_id));
                fields.insert("requestedOrgId".into(), json!(requested_org_id));
            }
            _ => {}
        }
        fields
    }
}

/// Errors raised while building a [`PermissionCatalog`](crate::PermissionCatalog).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A group was defined without member roles.
    #[error("permission group {0} has no member roles")]
    EmptyGroup(String),

    /// Two groups share a name.
    #[error("permission group {0} is defined more than once")]
    DuplicateGroup(String),
}
