//! The permission catalog.
//!
//! A permission group is a named capability ("can read pharmacy inventory")
//! together with the roles authorized for it. Groups are composed by explicit
//! enumeration: every group lists its member roles directly, even when that
//! repeats membership across groups. Reviewing one group never requires
//! tracing a hierarchy.
//!
//! The administrative tiers are listed explicitly in each group that supports
//! administrative override. There is no implicit elevation.
//!
//! # Examples
//!
//! ```
//! use hms_access::{PermissionCatalog, PermissionGroup, Role};
//!
//! let catalog = PermissionCatalog::standard();
//! let lab = catalog.resolve("LAB_PROCESS").unwrap();
//! assert!(lab.contains(Role::Nurse));
//! assert!(!lab.contains(Role::Doctor));
//!
//! assert!(catalog.resolve("NOT_A_GROUP").is_err());
//! assert!(catalog.resolve_group(PermissionGroup::OrgManage).is_ok());
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, CatalogError};
use crate::role::Role;

use Role::*;

/// Every permission group known at compile time.
///
/// Route configuration that arrives as data still names groups by string and
/// goes through [`PermissionCatalog::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionGroup {
    /// Every registered role.
    AllUsers,
    /// Both administrative tiers.
    Admins,
    /// Doctors and nurses.
    MedicalStaff,
    /// Every role taking part in patient care.
    ClinicalAll,
    /// Read patient records.
    PatientAccess,
    /// Register and update patients.
    PatientWrite,
    /// Outpatient visits and queues.
    OpdAccess,
    /// Record outpatient consultations.
    OpdConsultation,
    /// Inpatient admissions and bed occupancy.
    IpdAccess,
    /// Discharge inpatients.
    IpdDischarge,
    /// Read pharmacy inventory.
    PharmacyRead,
    /// Manage stock and dispense medicines.
    PharmacyManage,
    /// Write prescriptions.
    PrescriptionCreate,
    /// Order laboratory tests.
    LabOrder,
    /// Collect samples and enter lab results.
    LabProcess,
    /// Enter and release laboratory results.
    LabResults,
    /// Order imaging studies.
    RadiologyOrder,
    /// Perform and report imaging studies.
    RadiologyProcess,
    /// Read invoices.
    BillingView,
    /// Create invoices and record payments.
    BillingManage,
    /// Billing statistics.
    BillingReports,
    /// Read organization details.
    OrgView,
    /// Change organization settings.
    OrgManage,
    /// Role dashboards.
    DashboardAccess,
    /// Financial reporting.
    FinancialReports,
    /// Staff records and HR.
    HrManagement,
    /// Medical records department.
    MedicalRecordsAccess,
    /// General inventory.
    InventoryManage,
    /// Diet plans.
    DietaryManage,
    /// Physiotherapy sessions.
    TherapyManage,
}

impl PermissionGroup {
    /// Every group, in catalog order.
    pub const ALL: &'static [PermissionGroup] = &[
        PermissionGroup::AllUsers,
        PermissionGroup::Admins,
        PermissionGroup::MedicalStaff,
        PermissionGroup::ClinicalAll,
        PermissionGroup::PatientAccess,
        PermissionGroup::PatientWrite,
        PermissionGroup::OpdAccess,
        PermissionGroup::OpdConsultation,
        PermissionGroup::IpdAccess,
        PermissionGroup::IpdDischarge,
        PermissionGroup::PharmacyRead,
        PermissionGroup::PharmacyManage,
        PermissionGroup::PrescriptionCreate,
        PermissionGroup::LabOrder,
        PermissionGroup::LabProcess,
        PermissionGroup::LabResults,
        PermissionGroup::RadiologyOrder,
        PermissionGroup::RadiologyProcess,
        PermissionGroup::BillingView,
        PermissionGroup::BillingManage,
        PermissionGroup::BillingReports,
        PermissionGroup::OrgView,
        PermissionGroup::OrgManage,
        PermissionGroup::DashboardAccess,
        PermissionGroup::FinancialReports,
        PermissionGroup::HrManagement,
        PermissionGroup::MedicalRecordsAccess,
        PermissionGroup::InventoryManage,
        PermissionGroup::DietaryManage,
        PermissionGroup::TherapyManage,
    ];

    /// Returns the catalog key of this group.
    pub fn name(&self) -> &'static str {
        match self {
            PermissionGroup::AllUsers => "ALL_USERS",
            PermissionGroup::Admins => "ADMINS",
            PermissionGroup::MedicalStaff => "MEDICAL_STAFF",
            PermissionGroup::ClinicalAll => "CLINICAL_ALL",
            PermissionGroup::PatientAccess => "PATIENT_ACCESS",
            PermissionGroup::PatientWrite => "PATIENT_WRITE",
            PermissionGroup::OpdAccess => "OPD_ACCESS",
            PermissionGroup::OpdConsultation => "OPD_CONSULTATION",
            PermissionGroup::IpdAccess => "IPD_ACCESS",
            PermissionGroup::IpdDischarge => "IPD_DISCHARGE",
            PermissionGroup::PharmacyRead => "PHARMACY_READ",
            PermissionGroup::PharmacyManage => "PHARMACY_MANAGE",
            PermissionGroup::PrescriptionCreate => "PRESCRIPTION_CREATE",
            PermissionGroup::LabOrder => "LAB_ORDER",
            PermissionGroup::LabProcess => "LAB_PROCESS",
            PermissionGroup::LabResults => "LAB_RESULTS",
            PermissionGroup::RadiologyOrder => "RADIOLOGY_ORDER",
            PermissionGroup::RadiologyProcess => "RADIOLOGY_PROCESS",
            PermissionGroup::BillingView => "BILLING_VIEW",
            PermissionGroup::BillingManage => "BILLING_MANAGE",
            PermissionGroup::BillingReports => "BILLING_REPORTS",
            PermissionGroup::OrgView => "ORG_VIEW",
            PermissionGroup::OrgManage => "ORG_MANAGE",
            PermissionGroup::DashboardAccess => "DASHBOARD_ACCESS",
            PermissionGroup::FinancialReports => "FINANCIAL_REPORTS",
            PermissionGroup::HrManagement => "HR_MANAGEMENT",
            PermissionGroup::MedicalRecordsAccess => "MEDICAL_RECORDS_ACCESS",
            PermissionGroup::InventoryManage => "INVENTORY_MANAGE",
            PermissionGroup::DietaryManage => "DIETARY_MANAGE",
            PermissionGroup::TherapyManage => "THERAPY_MANAGE",
        }
    }

    /// Returns the roles enumerated for this group.
    pub fn members(&self) -> &'static [Role] {
        match self {
            PermissionGroup::AllUsers => Role::ALL,
            PermissionGroup::Admins => &[SuperAdmin, HospitalAdmin],
            PermissionGroup::MedicalStaff => &[Doctor, Nurse],
            PermissionGroup::ClinicalAll => &[Doctor, Nurse, LabTechnician, Radiologist],

            PermissionGroup::PatientAccess => {
                &[SuperAdmin, HospitalAdmin, Doctor, Nurse, Receptionist]
            }
            PermissionGroup::PatientWrite => {
                &[SuperAdmin, HospitalAdmin, Doctor, Nurse, Receptionist]
            }

            PermissionGroup::OpdAccess => &[SuperAdmin, HospitalAdmin, Doctor, Nurse, Receptionist],
            PermissionGroup::OpdConsultation => &[SuperAdmin, HospitalAdmin, Doctor],

            PermissionGroup::IpdAccess => &[SuperAdmin, HospitalAdmin, Doctor, Nurse],
            PermissionGroup::IpdDischarge => &[SuperAdmin, HospitalAdmin, Doctor],

            PermissionGroup::PharmacyRead => &[SuperAdmin, HospitalAdmin, Doctor, Pharmacist],
            PermissionGroup::PharmacyManage => &[SuperAdmin, HospitalAdmin, Pharmacist],
            PermissionGroup::PrescriptionCreate => &[SuperAdmin, HospitalAdmin, Doctor],

            PermissionGroup::LabOrder => &[SuperAdmin, HospitalAdmin, Doctor, Nurse],
            PermissionGroup::LabProcess => &[SuperAdmin, HospitalAdmin, Nurse, LabTechnician],
            PermissionGroup::LabResults => &[SuperAdmin, HospitalAdmin, LabTechnician],

            PermissionGroup::RadiologyOrder => &[SuperAdmin, HospitalAdmin, Doctor],
            PermissionGroup::RadiologyProcess => &[SuperAdmin, HospitalAdmin, Radiologist],

            PermissionGroup::BillingView => &[
                SuperAdmin,
                HospitalAdmin,
                Doctor,
                Receptionist,
                Billing,
                Accountant,
            ],
            PermissionGroup::BillingManage => &[SuperAdmin, HospitalAdmin, Receptionist, Billing],
            PermissionGroup::BillingReports => &[SuperAdmin, HospitalAdmin, Billing, Accountant],

            PermissionGroup::OrgView => &[SuperAdmin, HospitalAdmin],
            PermissionGroup::OrgManage => &[SuperAdmin],

            PermissionGroup::DashboardAccess => &[SuperAdmin, HospitalAdmin, Doctor],

            PermissionGroup::FinancialReports => &[SuperAdmin, HospitalAdmin, Accountant],
            PermissionGroup::HrManagement => &[SuperAdmin, HospitalAdmin, HrManager],
            PermissionGroup::MedicalRecordsAccess => &[
                SuperAdmin,
                HospitalAdmin,
                Doctor,
                Nurse,
                MedicalRecords,
            ],
            PermissionGroup::InventoryManage => {
                &[SuperAdmin, HospitalAdmin, InventoryManager, Pharmacist]
            }
            PermissionGroup::DietaryManage => &[SuperAdmin, HospitalAdmin, Dietitian, Doctor],
            PermissionGroup::TherapyManage => {
                &[SuperAdmin, HospitalAdmin, Physiotherapist, Doctor]
            }
        }
    }
}

impl fmt::Display for PermissionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PermissionGroup {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionGroup::ALL
            .iter()
            .copied()
            .find(|group| group.name() == s)
            .ok_or_else(|| AccessError::UnknownPermissionGroup {
                group: s.to_string(),
            })
    }
}

/// A set of roles with constant-time membership.
///
/// Listing order is kept so that diagnostics report roles the way the group
/// was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    members: HashSet<Role>,
    order: Vec<Role>,
}

impl RoleSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role. Returns `false` if it was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        if self.members.insert(role) {
            self.order.push(role);
            true
        } else {
            false
        }
    }

    /// Returns `true` if `role` is a member.
    pub fn contains(&self, role: Role) -> bool {
        self.members.contains(&role)
    }

    /// Returns the number of roles.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the set has no roles.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over the roles in listing order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.order.iter().copied()
    }

    /// Returns the roles in listing order.
    pub fn to_vec(&self) -> Vec<Role> {
        self.order.clone()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<&[Role]> for RoleSet {
    fn from(roles: &[Role]) -> Self {
        roles.iter().copied().collect()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

/// Immutable mapping from permission group name to its roles.
///
/// Built once at process start and shared by reference (typically inside an
/// `Arc`). There is no mutation path after construction.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    groups: HashMap<String, RoleSet>,
    order: Vec<String>,
}

impl PermissionCatalog {
    /// Builds the catalog of every [`PermissionGroup`].
    pub fn standard() -> Self {
        let mut groups = HashMap::with_capacity(PermissionGroup::ALL.len());
        let mut order = Vec::with_capacity(PermissionGroup::ALL.len());
        for group in PermissionGroup::ALL {
            groups.insert(group.name().to_string(), RoleSet::from(group.members()));
            order.push(group.name().to_string());
        }
        Self { groups, order }
    }

    /// Starts a custom catalog.
    pub fn builder() -> PermissionCatalogBuilder {
        PermissionCatalogBuilder::default()
    }

    /// Resolves a group name to its roles.
    ///
    /// An unregistered name is a configuration fault, never an empty set.
    pub fn resolve(&self, name: &str) -> Result<&RoleSet, AccessError> {
        self.groups
            .get(name)
            .ok_or_else(|| AccessError::UnknownPermissionGroup {
                group: name.to_string(),
            })
    }

    /// Resolves a compile-time group.
    ///
    /// Fails only for custom catalogs that omit the group.
    pub fn resolve_group(&self, group: PermissionGroup) -> Result<&RoleSet, AccessError> {
        self.resolve(group.name())
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Returns the registered group names in definition order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the names of every group `role` belongs to.
    pub fn groups_for_role(&self, role: Role) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.groups[name.as_str()].contains(role))
            .map(String::as_str)
            .collect()
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the catalog has no groups.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for a custom [`PermissionCatalog`].
///
/// Enforces the catalog invariants: every group has at least one role and no
/// name is defined twice.
#[derive(Debug, Default)]
pub struct PermissionCatalogBuilder {
    groups: Vec<(String, RoleSet)>,
}

impl PermissionCatalogBuilder {
    /// Adds a group with explicitly enumerated roles.
    pub fn group(mut self, name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        self.groups.push((name.into(), roles.into_iter().collect()));
        self
    }

    /// Adds every compile-time group with its standard membership.
    pub fn with_standard_groups(mut self) -> Self {
        for group in PermissionGroup::ALL {
            self.groups
                .push((group.name().to_string(), RoleSet::from(group.members())));
        }
        self
    }

    /// Validates and freezes the catalog.
    pub fn build(self) -> Result<PermissionCatalog, CatalogError> {
        let mut groups = HashMap::with_capacity(self.groups.len());
        let mut order = Vec::with_capacity(self.groups.len());
        for (name, roles) in self.groups {
            if roles.is_empty() {
                return Err(CatalogError::EmptyGroup(name));
            }
            if groups.contains_key(&name) {
                return Err(CatalogError::DuplicateGroup(name));
            }
            order.push(name.clone());
            groups.insert(name, roles);
        }
        Ok(PermissionCatalog { groups, order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_group_is_non_empty() {
        let catalog = PermissionCatalog::standard();
        for name in catalog.group_names() {
            assert!(!catalog.resolve(name).unwrap().is_empty(), "{name} is empty");
        }
        assert_eq!(catalog.len(), PermissionGroup::ALL.len());
    }

    #[test]
    fn test_group_names_round_trip() {
        for group in PermissionGroup::ALL {
            assert_eq!(group.name().parse::<PermissionGroup>().unwrap(), *group);
            assert_eq!(
                serde_json::to_value(group).unwrap(),
                serde_json::json!(group.name())
            );
        }
    }

    #[test]
    fn test_unknown_group_is_a_fault() {
        let catalog = PermissionCatalog::standard();
        let err = catalog.resolve("LAB_EVERYTHING").unwrap_err();
        assert_eq!(
            err,
            AccessError::UnknownPermissionGroup {
                group: "LAB_EVERYTHING".into()
            }
        );
        assert!(err.is_server_fault());
    }

    #[test]
    fn test_all_users_covers_registry() {
        let catalog = PermissionCatalog::standard();
        let all = catalog.resolve_group(PermissionGroup::AllUsers).unwrap();
        for role in Role::ALL {
            assert!(all.contains(*role));
        }
    }

    #[test]
    fn test_admin_tiers_listed_in_override_groups() {
        let catalog = PermissionCatalog::standard();
        let override_groups = [
            PermissionGroup::BillingView,
            PermissionGroup::BillingManage,
            PermissionGroup::LabProcess,
            PermissionGroup::RadiologyProcess,
            PermissionGroup::TherapyManage,
        ];
        for group in override_groups {
            let roles = catalog.resolve_group(group).unwrap();
            assert!(roles.contains(SuperAdmin), "{group}");
            assert!(roles.contains(HospitalAdmin), "{group}");
        }
    }

    #[test]
    fn test_org_manage_is_super_tier_only() {
        let catalog = PermissionCatalog::standard();
        let roles = catalog.resolve_group(PermissionGroup::OrgManage).unwrap();
        assert_eq!(roles.to_vec(), vec![SuperAdmin]);
    }

    #[test]
    fn test_role_set_keeps_listing_order() {
        let set = RoleSet::from([Radiologist, SuperAdmin, Radiologist, HospitalAdmin]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_vec(), vec![Radiologist, SuperAdmin, HospitalAdmin]);
    }

    #[test]
    fn test_groups_for_role() {
        let catalog = PermissionCatalog::standard();
        let groups = catalog.groups_for_role(Radiologist);
        assert!(groups.contains(&"RADIOLOGY_PROCESS"));
        assert!(groups.contains(&"CLINICAL_ALL"));
        assert!(groups.contains(&"ALL_USERS"));
        assert!(!groups.contains(&"RADIOLOGY_ORDER"));
    }

    #[test]
    fn test_builder_rejects_empty_group() {
        let result = PermissionCatalog::builder()
            .group("NOBODY", Vec::<Role>::new())
            .build();
        assert_eq!(result.unwrap_err(), CatalogError::EmptyGroup("NOBODY".into()));
    }

    #[test]
    fn test_builder_rejects_duplicate_group() {
        let result = PermissionCatalog::builder()
            .with_standard_groups()
            .group("ADMINS", [SuperAdmin])
            .build();
        assert_eq!(
            result.unwrap_err(),
            CatalogError::DuplicateGroup("ADMINS".into())
        );
    }

    #[test]
    fn test_builder_custom_catalog() {
        let catalog = PermissionCatalog::builder()
            .group("KITCHEN", [SuperAdmin, HospitalAdmin, Dietitian])
            .build()
            .unwrap();
        assert!(catalog.resolve("KITCHEN").unwrap().contains(Dietitian));
        assert!(catalog.resolve_group(PermissionGroup::LabOrder).is_err());
    }
}
