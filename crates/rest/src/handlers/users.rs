//! Handlers describing the calling user.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hms_access::effective_org_id;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::AccessScope;
use crate::state::AppState;

/// Returns the authenticated user and the organization they act within.
///
/// # HTTP Request
///
/// `GET [base]/users/me`
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": "u42", "role": "Nurse", "orgId": "org-1" },
///   "category": "clinical",
///   "effectiveOrgId": "org-1"
/// }
/// ```
///
/// `effectiveOrgId` is `null` for a principal without a home organization.
pub async fn me_handler(scope: AccessScope) -> RestResult<Response> {
    let principal = scope.principal();
    debug!(user_id = %principal.id, "Processing current user request");

    let effective = effective_org_id(Some(principal), None);

    let response = serde_json::json!({
        "user": principal,
        "category": principal.role.category(),
        "effectiveOrgId": effective,
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Lists the roles the caller may assign to other users.
///
/// # HTTP Request
///
/// `GET [base]/api/users/roles/available`
pub async fn roles_available_handler(scope: AccessScope) -> impl IntoResponse {
    let roles = scope.principal().role.assignable_roles();
    Json(serde_json::json!({ "roles": roles }))
}

/// Lists the permission groups that include the caller's role.
///
/// # HTTP Request
///
/// `GET [base]/api/access/permissions`
pub async fn permissions_handler(
    State(state): State<AppState>,
    scope: AccessScope,
) -> impl IntoResponse {
    let role = scope.principal().role;
    Json(serde_json::json!({
        "role": role,
        "permissions": state.catalog().groups_for_role(role),
    }))
}
