//! The authenticated identity attached to a request.

use serde::{Deserialize, Serialize};

use crate::org::OrgId;
use crate::role::Role;

/// The authenticated identity of one request.
///
/// Produced by an external credential verifier and discarded when the request
/// ends. Never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User identifier.
    pub id: String,
    /// The user's role.
    pub role: Role,
    /// Home organization. Absent for organization-agnostic roles.
    #[serde(default, rename = "orgId", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrgId>,
}

impl Principal {
    /// Creates a principal scoped to an organization.
    pub fn new(id: impl Into<String>, role: Role, organization_id: impl Into<OrgId>) -> Self {
        Self {
            id: id.into(),
            role,
            organization_id: Some(organization_id.into()),
        }
    }

    /// Creates a principal without a home organization.
    pub fn unscoped(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            organization_id: None,
        }
    }

    /// Returns the principal's home organization, if any.
    pub fn organization_id(&self) -> Option<&OrgId> {
        self.organization_id.as_ref()
    }

    /// Returns `true` if the principal has exactly `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the principal has any of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Returns `true` if the principal may see data of `org`.
    ///
    /// Organization-agnostic roles match every organization.
    pub fn is_same_org(&self, org: &OrgId) -> bool {
        self.role.is_organization_agnostic() || self.organization_id.as_ref() == Some(org)
    }
}
