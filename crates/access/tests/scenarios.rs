//! End-to-end decisions for representative hospital requests.

use std::sync::Arc;

use hms_access::chain::{AdminTier, AnyRole, Permission, TenantScope};
use hms_access::{
    AccessChain, AccessError, AccessRequest, OrgId, PermissionCatalog, Principal, Role, RoleSet,
};
use serde_json::json;

fn permission_scoped(group: &str) -> AccessChain {
    AccessChain::new(vec![Arc::new(Permission::new(group)), Arc::new(TenantScope)])
}

#[test]
fn nurse_processes_lab_sample_in_own_org() {
    let catalog = PermissionCatalog::standard();
    let nurse = Principal::new("u42", Role::Nurse, "org-1");

    let grant = permission_scoped("LAB_PROCESS")
        .evaluate(&catalog, &AccessRequest::new(Some(nurse)))
        .unwrap();

    assert_eq!(grant.effective_org(), Some(&OrgId::new("org-1")));
}

#[test]
fn nurse_cannot_process_radiology() {
    let catalog = PermissionCatalog::standard();
    let nurse = Principal::new("u42", Role::Nurse, "org-1");

    let err = permission_scoped("RADIOLOGY_PROCESS")
        .evaluate(&catalog, &AccessRequest::new(Some(nurse)))
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
    let fields = err.diagnostics();
    assert_eq!(
        fields["requiredRoles"],
        json!(["SuperAdmin", "HospitalAdmin", "Radiologist"])
    );
    assert_eq!(fields["userRole"], "Nurse");
}

#[test]
fn super_admin_targets_a_specific_org() {
    let catalog = PermissionCatalog::standard();
    let root = Principal::unscoped("u9", Role::SuperAdmin);

    let grant = permission_scoped("ORG_VIEW")
        .evaluate(
            &catalog,
            &AccessRequest::new(Some(root.clone())).with_requested_org("org-7"),
        )
        .unwrap();
    assert_eq!(grant.effective_org(), Some(&OrgId::new("org-7")));

    let grant = permission_scoped("ORG_VIEW")
        .evaluate(&catalog, &AccessRequest::new(Some(root)))
        .unwrap();
    assert!(grant.is_scoped());
    assert_eq!(grant.effective_org(), None);
}

#[test]
fn hospital_admin_cannot_reach_another_hospital() {
    let catalog = PermissionCatalog::standard();
    let admin = Principal::new("u8", Role::HospitalAdmin, "A");

    let chain = AccessChain::new(vec![Arc::new(AdminTier), Arc::new(TenantScope)]);
    let err = chain
        .evaluate(
            &catalog,
            &AccessRequest::new(Some(admin)).with_requested_org("B"),
        )
        .unwrap_err();

    assert_eq!(
        err,
        AccessError::CrossTenantAccess {
            user_org_id: OrgId::new("A"),
            requested_org_id: OrgId::new("B"),
        }
    );
}

#[test]
fn misconfigured_user_without_org_is_forbidden_not_crashed() {
    let catalog = PermissionCatalog::standard();
    let receptionist = Principal::unscoped("u3", Role::Receptionist);

    let chain = AccessChain::new(vec![
        Arc::new(AnyRole(RoleSet::from([Role::Receptionist]))),
        Arc::new(TenantScope),
    ]);
    let err = chain
        .evaluate(&catalog, &AccessRequest::new(Some(receptionist)))
        .unwrap_err();

    assert_eq!(err, AccessError::NoOrganizationAssigned);
    assert_eq!(err.status_code(), 403);
}

#[test]
fn alternate_catalog_is_injected() {
    let catalog = PermissionCatalog::builder()
        .group("LAB_PROCESS", [Role::SuperAdmin, Role::LabTechnician])
        .build()
        .unwrap();
    let nurse = Principal::new("u42", Role::Nurse, "org-1");

    let err = permission_scoped("LAB_PROCESS")
        .evaluate(&catalog, &AccessRequest::new(Some(nurse)))
        .unwrap_err();
    assert!(matches!(err, AccessError::InsufficientRole { .. }));
}
