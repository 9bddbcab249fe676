//! Integration tests for tenant isolation.
//!
//! Tests how the requested organization is resolved from the query, the JSON
//! body and the path, how cross-tenant requests are denied, and how the
//! `orgId` query parameter seen by handlers is bound to the effective
//! organization.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::assertions::{assert_error, assert_forbidden};
use common::harness::*;
use hms_rest::ServerConfig;

const CROSS_TENANT: &str = "Access denied. Cannot access other organizations.";

// =============================================================================
// Query binding
// =============================================================================

mod query_binding {
    use super::*;

    #[tokio::test]
    async fn test_org_is_injected_when_absent() {
        let server = echo_server();

        let response = server
            .get("/api/patients")
            .add_query_param("page", "2")
            .as_caller(&NURSE_A)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["effectiveOrgId"], "org-A");
        assert_eq!(body["query"], json!({ "page": "2", "orgId": "org-A" }));
    }

    #[tokio::test]
    async fn test_matching_org_is_kept() {
        let server = echo_server();

        let response = server
            .get("/api/patients")
            .add_query_param("orgId", "org-A")
            .as_caller(&NURSE_A)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["query"]["orgId"], "org-A");
    }

    #[tokio::test]
    async fn test_cross_tenant_query_is_denied() {
        let server = echo_server();

        let response = server
            .get("/api/patients")
            .add_query_param("orgId", "org-B")
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_forbidden(&response, CROSS_TENANT);
        assert_eq!(entry["userOrgId"], "org-A");
        assert_eq!(entry["requestedOrgId"], "org-B");
    }

    #[tokio::test]
    async fn test_admin_cannot_cross_tenants() {
        let server = echo_server();

        let response = server
            .get("/api/organizations")
            .add_query_param("orgId", "org-B")
            .as_caller(&ADMIN_A)
            .await;

        assert_forbidden(&response, CROSS_TENANT);
    }

    #[tokio::test]
    async fn test_user_without_org_is_denied() {
        let server = echo_server();

        let response = server
            .get("/api/patients")
            .as_caller(&ORPHAN_RECEPTIONIST)
            .await;

        assert_forbidden(&response, "User has no organization assigned");
    }
}

// =============================================================================
// Super-tier
// =============================================================================

mod super_tier {
    use super::*;

    #[tokio::test]
    async fn test_super_admin_targets_requested_org() {
        let server = echo_server();

        let response = server
            .get("/api/patients")
            .add_query_param("orgId", "org-7")
            .as_caller(&SUPER_ADMIN)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["effectiveOrgId"], "org-7");
        assert_eq!(body["query"]["orgId"], "org-7");
    }

    #[tokio::test]
    async fn test_super_admin_without_org_is_unscoped() {
        let server = echo_server();

        let response = server.get("/api/patients").as_caller(&SUPER_ADMIN).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["effectiveOrgId"], Value::Null);
        assert_eq!(body["query"], json!({}));
    }

    #[tokio::test]
    async fn test_super_admin_query_outranks_body() {
        let server = echo_server();

        let response = server
            .post("/api/patients")
            .add_query_param("orgId", "org-7")
            .json(&json!({ "orgId": "org-8" }))
            .as_caller(&SUPER_ADMIN)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["effectiveOrgId"], "org-7");
        assert_eq!(body["query"]["orgId"], "org-7");
    }
}

// =============================================================================
// Body and path sources
// =============================================================================

mod other_sources {
    use super::*;

    #[tokio::test]
    async fn test_cross_tenant_body_is_denied() {
        let server = echo_server();

        let response = server
            .post("/api/patients")
            .json(&json!({ "name": "Jane Roe", "orgId": "org-B" }))
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_forbidden(&response, CROSS_TENANT);
        assert_eq!(entry["requestedOrgId"], "org-B");
    }

    #[tokio::test]
    async fn test_body_reaches_handler_intact() {
        let server = echo_server();
        let patient = json!({ "name": "Jane Roe", "age": 41 });

        let response = server
            .post("/api/patients")
            .json(&patient)
            .as_caller(&RECEPTIONIST_B)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["body"], patient);
        assert_eq!(body["query"]["orgId"], "org-B");
    }

    #[tokio::test]
    async fn test_numeric_body_org_is_read() {
        let server = echo_server();

        let response = server
            .post("/api/patients")
            .json(&json!({ "orgId": 42 }))
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_forbidden(&response, CROSS_TENANT);
        assert_eq!(entry["requestedOrgId"], "42");
    }

    #[tokio::test]
    async fn test_org_path_param_is_scoped() {
        let server = echo_server();

        server
            .get("/api/organizations/org-A")
            .as_caller(&ADMIN_A)
            .await
            .assert_status_ok();

        let response = server
            .get("/api/organizations/org-B")
            .as_caller(&ADMIN_A)
            .await;
        assert_forbidden(&response, CROSS_TENANT);
    }

    #[tokio::test]
    async fn test_plain_id_path_param_is_not_an_org() {
        let server = echo_server();

        // `{id}` on patients is a patient id, never an organization.
        server
            .get("/api/patients/org-B")
            .as_caller(&NURSE_A)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_matching_query_does_not_cover_foreign_body() {
        let server = echo_server();

        let response = server
            .post("/api/patients")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-B" }))
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_forbidden(&response, CROSS_TENANT);
        assert_eq!(entry["userOrgId"], "org-A");
        assert_eq!(entry["requestedOrgId"], "org-B");
    }

    #[tokio::test]
    async fn test_matching_query_does_not_cover_foreign_path_org() {
        let server = echo_server();

        let response = server
            .patch("/api/organizations/org-B")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "name": "Renamed" }))
            .as_caller(&ADMIN_A)
            .await;

        let entry = assert_forbidden(&response, CROSS_TENANT);
        assert_eq!(entry["requestedOrgId"], "org-B");
    }

    #[tokio::test]
    async fn test_agreeing_sources_pass_in_lenient_mode() {
        let server = echo_server();

        let response = server
            .patch("/api/organizations/org-A")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-A", "name": "Renamed" }))
            .as_caller(&ADMIN_A)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["effectiveOrgId"], "org-A");
    }

    #[tokio::test]
    async fn test_oversized_json_body_is_rejected() {
        let server = echo_server();
        let padding = "x".repeat(ServerConfig::for_testing().max_body_size + 1);

        let response = server
            .post("/api/patients")
            .json(&json!({ "padding": padding }))
            .as_caller(&NURSE_A)
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_oversized_body_from_anonymous_caller_is_unauthorized() {
        let server = echo_server();
        let padding = "x".repeat(ServerConfig::for_testing().max_body_size + 1);

        let response = server
            .post("/api/patients")
            .json(&json!({ "padding": padding }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Strict validation
// =============================================================================

mod strict_mode {
    use super::*;

    fn strict_server() -> axum_test::TestServer {
        echo_server_with(ServerConfig {
            strict_org_validation: true,
            ..ServerConfig::for_testing()
        })
    }

    #[tokio::test]
    async fn test_disagreeing_sources_are_rejected() {
        let server = strict_server();

        let response = server
            .post("/api/patients")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-B" }))
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_error(
            &response,
            StatusCode::BAD_REQUEST,
            "Conflicting organization ids in request",
        );
        assert_eq!(
            entry["orgIdSources"],
            json!({ "query": "org-A", "body": "org-B" })
        );
    }

    #[tokio::test]
    async fn test_agreeing_sources_pass() {
        let server = strict_server();

        server
            .post("/api/patients")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-A", "name": "Jane Roe" }))
            .as_caller(&NURSE_A)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_path_and_body_disagreement_is_rejected() {
        let server = strict_server();

        let response = server
            .patch("/api/organizations/org-A")
            .json(&json!({ "orgId": "org-B" }))
            .as_caller(&ADMIN_A)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_rejected_before_validation() {
        let server = strict_server();

        let response = server
            .post("/api/patients")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-B" }))
            .await;

        assert_error(&response, StatusCode::UNAUTHORIZED, "Authentication required");
    }

    #[tokio::test]
    async fn test_role_check_precedes_validation() {
        let server = strict_server();

        let response = server
            .patch("/api/radiology/tests/7")
            .add_query_param("orgId", "org-A")
            .json(&json!({ "orgId": "org-B" }))
            .as_caller(&NURSE_A)
            .await;

        let entry = assert_forbidden(&response, "Access denied. Insufficient permissions.");
        assert_eq!(entry["userRole"], "Nurse");
        assert!(entry.get("requestedOrgId").is_none());
    }
}
