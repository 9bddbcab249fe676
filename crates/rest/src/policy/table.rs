//! The route policy table.

use std::collections::HashSet;
use std::path::Path;

use hms_access::{PermissionCatalog, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::PolicyError;
use super::rule::{RouteGuard, RouteRule};

/// Routes that may see any ward or bed record.
const WARD_STAFF: [Role; 4] = [
    Role::SuperAdmin,
    Role::HospitalAdmin,
    Role::Doctor,
    Role::Nurse,
];

/// Roles allowed onto the per-role dashboards.
const DASHBOARD_VIEWERS: [Role; 3] = [Role::HospitalAdmin, Role::Doctor, Role::Nurse];

/// An ordered list of route rules.
///
/// JSON form:
///
/// ```json
/// { "routes": [
///   { "method": "PATCH", "path": "/api/lab/tests/{id}/sample",
///     "guard": { "type": "permission", "group": "LAB_PROCESS" } }
/// ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<RouteRule>,
}

impl RouteTable {
    /// Creates a table from rules.
    pub fn new(routes: Vec<RouteRule>) -> Self {
        Self { routes }
    }

    /// Routes served by this crate's own handlers.
    pub fn system() -> Self {
        Self::new(vec![
            RouteRule::get("/users/me", RouteGuard::Authenticated)
                .unscoped()
                .with_action("users.me"),
            RouteRule::get("/api/users/roles/available", RouteGuard::Admin)
                .with_action("users.roles.available"),
            RouteRule::get("/api/access/permissions", RouteGuard::Authenticated)
                .unscoped()
                .with_action("access.permissions"),
        ])
    }

    /// The hospital domain routes and the capability each requires.
    pub fn standard() -> Self {
        use RouteGuard::{Admin, SuperAdmin};
        let perm = RouteGuard::permission;

        Self::new(vec![
            // Patients
            RouteRule::get("/api/patients", perm("PATIENT_ACCESS")),
            RouteRule::post("/api/patients", perm("PATIENT_WRITE")),
            RouteRule::get("/api/patients/code/{code}", perm("PATIENT_ACCESS")),
            RouteRule::get("/api/patients/{id}", perm("PATIENT_ACCESS")),
            RouteRule::patch("/api/patients/{id}", perm("PATIENT_WRITE")),
            RouteRule::delete("/api/patients/{id}", Admin),
            RouteRule::get("/api/patients/{id}/history", perm("PATIENT_ACCESS")),
            // Outpatient department
            RouteRule::get("/api/opd/tokens", perm("OPD_ACCESS")),
            RouteRule::post("/api/opd/tokens", perm("OPD_ACCESS")),
            RouteRule::get("/api/opd/tokens/{id}", perm("OPD_ACCESS")),
            RouteRule::patch("/api/opd/tokens/{id}", perm("OPD_ACCESS")),
            RouteRule::post("/api/opd/tokens/{id}/call", perm("OPD_CONSULTATION")),
            RouteRule::post("/api/opd/tokens/{id}/complete", perm("OPD_CONSULTATION")),
            RouteRule::get("/api/opd/queue", perm("OPD_ACCESS")),
            RouteRule::get("/api/opd/stats", perm("OPD_ACCESS")),
            // Appointments
            RouteRule::get("/api/appointments", perm("OPD_ACCESS")),
            RouteRule::post("/api/appointments", perm("OPD_ACCESS")),
            RouteRule::get("/api/appointments/{id}", perm("OPD_ACCESS")),
            RouteRule::patch("/api/appointments/{id}", perm("OPD_ACCESS")),
            RouteRule::delete("/api/appointments/{id}", Admin),
            // Inpatient department
            RouteRule::get("/api/ipd/admissions", perm("IPD_ACCESS")),
            RouteRule::post("/api/ipd/admissions", perm("IPD_ACCESS")),
            RouteRule::get("/api/ipd/admissions/{id}", perm("IPD_ACCESS")),
            RouteRule::patch("/api/ipd/admissions/{id}", perm("IPD_ACCESS")),
            RouteRule::post("/api/ipd/admissions/{id}/discharge", perm("IPD_DISCHARGE")),
            // Beds
            RouteRule::get("/api/beds", RouteGuard::roles(WARD_STAFF)),
            RouteRule::post("/api/beds", perm("IPD_ACCESS")),
            RouteRule::get("/api/beds/stats/summary", RouteGuard::roles(WARD_STAFF)),
            RouteRule::get("/api/beds/{id}", RouteGuard::roles(WARD_STAFF)),
            RouteRule::patch("/api/beds/{id}", perm("IPD_ACCESS")),
            RouteRule::delete("/api/beds/{id}", Admin),
            // Pharmacy
            RouteRule::get("/api/pharmacy/medicines", perm("PHARMACY_READ")),
            RouteRule::post("/api/pharmacy/medicines", perm("PHARMACY_MANAGE")),
            RouteRule::get("/api/pharmacy/medicines/{id}", perm("PHARMACY_READ")),
            RouteRule::patch("/api/pharmacy/medicines/{id}", perm("PHARMACY_MANAGE")),
            RouteRule::get("/api/pharmacy/prescriptions", perm("PHARMACY_READ")),
            RouteRule::post("/api/pharmacy/prescriptions", perm("PRESCRIPTION_CREATE")),
            RouteRule::get("/api/pharmacy/prescriptions/{id}", perm("PHARMACY_READ")),
            RouteRule::post("/api/pharmacy/orders", perm("PHARMACY_MANAGE")),
            // Laboratory
            RouteRule::get("/api/lab/tests", perm("LAB_ORDER")),
            RouteRule::post("/api/lab/tests", perm("LAB_ORDER")),
            RouteRule::get("/api/lab/tests/{id}", perm("LAB_ORDER")),
            RouteRule::patch("/api/lab/tests/{id}/sample", perm("LAB_PROCESS")),
            RouteRule::patch("/api/lab/tests/{id}/results", perm("LAB_RESULTS")),
            // Radiology
            RouteRule::get("/api/radiology/tests", perm("RADIOLOGY_ORDER")),
            RouteRule::post("/api/radiology/tests", perm("RADIOLOGY_ORDER")),
            RouteRule::get("/api/radiology/tests/{id}", perm("RADIOLOGY_ORDER")),
            RouteRule::patch("/api/radiology/tests/{id}", perm("RADIOLOGY_PROCESS")),
            // Billing
            RouteRule::get("/api/billing/invoices", perm("BILLING_VIEW")),
            RouteRule::post("/api/billing/invoices", perm("BILLING_MANAGE")),
            RouteRule::get("/api/billing/invoices/{id}", perm("BILLING_VIEW")),
            RouteRule::post("/api/billing/payments", perm("BILLING_MANAGE")),
            RouteRule::get("/api/billing/statistics", perm("BILLING_REPORTS")),
            // Departments
            RouteRule::get("/api/departments", perm("PATIENT_ACCESS")),
            RouteRule::post("/api/departments", Admin),
            RouteRule::get("/api/departments/beds", perm("IPD_ACCESS")),
            RouteRule::post("/api/departments/beds", Admin),
            // Organizations
            RouteRule::get("/api/organizations", perm("ORG_VIEW")),
            RouteRule::post("/api/organizations", SuperAdmin).unscoped(),
            RouteRule::get("/api/organizations/{id}", perm("ORG_VIEW")).with_org_param("id"),
            RouteRule::patch("/api/organizations/{id}", Admin).with_org_param("id"),
            RouteRule::delete("/api/organizations/{id}", SuperAdmin).unscoped(),
            // Staff
            RouteRule::get("/api/staff", RouteGuard::roles([Role::SuperAdmin, Role::HospitalAdmin])),
            RouteRule::get(
                "/api/staff/stats/summary",
                RouteGuard::roles([Role::SuperAdmin, Role::HospitalAdmin]),
            ),
            RouteRule::get(
                "/api/staff/{id}",
                RouteGuard::roles([Role::SuperAdmin, Role::HospitalAdmin]),
            ),
            // Dashboards
            RouteRule::get("/api/dashboard/superadmin", SuperAdmin).unscoped(),
            RouteRule::get("/api/dashboard/hospital-admin", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/doctor", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/nurse", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/receptionist", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/pharmacist", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/lab-technician", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/radiologist", RouteGuard::roles(DASHBOARD_VIEWERS)),
            RouteRule::get("/api/dashboard/billing", RouteGuard::roles(DASHBOARD_VIEWERS)),
            // Users
            RouteRule::get("/api/users", Admin),
            RouteRule::post("/api/users", Admin),
            RouteRule::get("/api/users/{id}", Admin),
            RouteRule::patch("/api/users/{id}", Admin),
            RouteRule::delete("/api/users/{id}", Admin),
        ])
    }

    /// Parses a table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a table from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&json)?;
        debug!(path = %path.display(), routes = table.len(), "Loaded route policy table");
        Ok(table)
    }

    /// Returns the rules in order.
    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Appends every rule of `other`.
    pub fn extend(mut self, other: RouteTable) -> Self {
        self.routes.extend(other.routes);
        self
    }

    /// Checks the table against a catalog.
    ///
    /// Reports every defect rather than stopping at the first: unknown
    /// permission groups, empty role lists, duplicate routes, malformed paths,
    /// and parameters the path does not declare.
    pub fn validate(&self, catalog: &PermissionCatalog) -> Result<(), Vec<PolicyError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for rule in &self.routes {
            if !rule.path.starts_with('/') {
                errors.push(PolicyError::InvalidPath {
                    path: rule.path.clone(),
                });
            }

            if !seen.insert((rule.method, rule.path.as_str())) {
                errors.push(PolicyError::DuplicateRoute {
                    method: rule.method,
                    path: rule.path.clone(),
                });
            }

            match &rule.guard {
                RouteGuard::Permission { group } if !catalog.contains(group) => {
                    errors.push(PolicyError::UnknownGroup {
                        method: rule.method,
                        path: rule.path.clone(),
                        group: group.clone(),
                    });
                }
                RouteGuard::Roles { roles } if roles.is_empty() => {
                    errors.push(PolicyError::EmptyRoles {
                        method: rule.method,
                        path: rule.path.clone(),
                    });
                }
                RouteGuard::OwnerOrAdmin { param } => {
                    check_param(rule, param, &mut errors);
                }
                _ => {}
            }

            if let Some(param) = &rule.org_param {
                check_param(rule, param, &mut errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_param(rule: &RouteRule, param: &str, errors: &mut Vec<PolicyError>) {
    if !rule.path_params().any(|p| p == param) {
        errors.push(PolicyError::UnknownParam {
            method: rule.method,
            path: rule.path.clone(),
            param: param.to_string(),
        });
    }
}
