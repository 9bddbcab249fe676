//! The role registry.
//!
//! A [`Role`] identifies a job function within a hospital. The set of roles is
//! closed: adding one is a deployment-time change (a new variant, its entry in
//! [`Role::ALL`], its wire name, and its permission group memberships).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A job function recognized by the system.
///
/// Wire names (serde, [`Display`](fmt::Display), [`FromStr`]) are the
/// PascalCase variant names, e.g. `"HospitalAdmin"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Platform operator. Organization-agnostic, may act across every tenant.
    SuperAdmin,
    /// Administrator of a single hospital organization.
    HospitalAdmin,
    /// Physician.
    Doctor,
    /// Nurse.
    Nurse,
    /// Front-desk staff.
    Receptionist,
    /// Pharmacist.
    Pharmacist,
    /// Laboratory technician.
    LabTechnician,
    /// Imaging technician.
    Radiologist,
    /// Billing clerk.
    Billing,
    /// Accountant.
    Accountant,
    /// Human resources manager.
    #[serde(rename = "HRManager")]
    HrManager,
    /// Medical records officer.
    MedicalRecords,
    /// Inventory manager.
    InventoryManager,
    /// Dietitian.
    Dietitian,
    /// Physiotherapist.
    Physiotherapist,
}

/// Broad grouping of roles, used for display and reporting only.
///
/// Categories never participate in access decisions; permission groups
/// enumerate their roles explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleCategory {
    /// Administrative tiers.
    Administrative,
    /// Patient-facing clinical roles.
    Clinical,
    /// Departmental and support operations.
    Operational,
    /// Billing and accounting.
    Financial,
}

impl Role {
    /// Every registered role, in registry order.
    pub const ALL: &'static [Role] = &[
        Role::SuperAdmin,
        Role::HospitalAdmin,
        Role::Doctor,
        Role::Nurse,
        Role::Receptionist,
        Role::Pharmacist,
        Role::LabTechnician,
        Role::Radiologist,
        Role::Billing,
        Role::Accountant,
        Role::HrManager,
        Role::MedicalRecords,
        Role::InventoryManager,
        Role::Dietitian,
        Role::Physiotherapist,
    ];

    /// Returns the wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::HospitalAdmin => "HospitalAdmin",
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
            Role::Receptionist => "Receptionist",
            Role::Pharmacist => "Pharmacist",
            Role::LabTechnician => "LabTechnician",
            Role::Radiologist => "Radiologist",
            Role::Billing => "Billing",
            Role::Accountant => "Accountant",
            Role::HrManager => "HRManager",
            Role::MedicalRecords => "MedicalRecords",
            Role::InventoryManager => "InventoryManager",
            Role::Dietitian => "Dietitian",
            Role::Physiotherapist => "Physiotherapist",
        }
    }

    /// Returns `true` for the organization-agnostic super-tier.
    pub fn is_super_tier(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Returns `true` for either administrative tier (super or org admin).
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::HospitalAdmin)
    }

    /// Returns `true` if principals with this role have no home organization
    /// by design and are exempt from tenant scoping.
    ///
    /// A non-agnostic principal without an organization is a misconfigured
    /// user record, not an agnostic one.
    pub fn is_organization_agnostic(&self) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::HospitalAdmin
            | Role::Doctor
            | Role::Nurse
            | Role::Receptionist
            | Role::Pharmacist
            | Role::LabTechnician
            | Role::Radiologist
            | Role::Billing
            | Role::Accountant
            | Role::HrManager
            | Role::MedicalRecords
            | Role::InventoryManager
            | Role::Dietitian
            | Role::Physiotherapist => false,
        }
    }

    /// Returns the display category of this role.
    pub fn category(&self) -> RoleCategory {
        match self {
            Role::SuperAdmin | Role::HospitalAdmin => RoleCategory::Administrative,
            Role::Doctor | Role::Nurse | Role::Dietitian | Role::Physiotherapist => {
                RoleCategory::Clinical
            }
            Role::Receptionist
            | Role::Pharmacist
            | Role::LabTechnician
            | Role::Radiologist
            | Role::HrManager
            | Role::MedicalRecords
            | Role::InventoryManager => RoleCategory::Operational,
            Role::Billing | Role::Accountant => RoleCategory::Financial,
        }
    }

    /// Returns the roles a user with this role may assign to other users.
    ///
    /// The super-tier may assign any role. The org admin tier may assign
    /// every role except the two administrative tiers. Everyone else assigns
    /// nothing.
    pub fn assignable_roles(&self) -> Vec<Role> {
        match self {
            Role::SuperAdmin => Role::ALL.to_vec(),
            Role::HospitalAdmin => Role::ALL
                .iter()
                .copied()
                .filter(|role| !role.is_admin_tier())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Returns `true` if `name` is the wire name of a registered role.
pub fn is_known_role(name: &str) -> bool {
    name.parse::<Role>().is_ok()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unregistered role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
