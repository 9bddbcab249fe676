//! REST API test harness.
//!
//! Builds in-process test servers around the access layer and a small domain
//! router whose handlers echo what they were given, so tests can see exactly
//! what a handler receives after the access layer ran.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderName, HeaderValue},
    routing::{get, patch},
};
use axum_test::{TestRequest, TestServer};
use hms_access::{PermissionCatalog, Role};
use serde_json::{Value, json};

use hms_rest::auth::{TrustedHeaderVerifier, X_AUTHENTICATED_ORG_ID, X_AUTHENTICATED_ROLE, X_AUTHENTICATED_USER_ID};
use hms_rest::extractors::AccessScope;
use hms_rest::policy::RouteTable;
use hms_rest::{AppState, ServerConfig, create_app};

/// An identity presented through the trusted gateway headers.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: &'static str,
    pub role: Role,
    pub org: Option<&'static str>,
}

impl Caller {
    pub const fn new(id: &'static str, role: Role, org: &'static str) -> Self {
        Self {
            id,
            role,
            org: Some(org),
        }
    }

    pub const fn without_org(id: &'static str, role: Role) -> Self {
        Self { id, role, org: None }
    }
}

pub const SUPER_ADMIN: Caller = Caller::without_org("u-super", Role::SuperAdmin);
pub const ADMIN_A: Caller = Caller::new("u-admin-a", Role::HospitalAdmin, "org-A");
pub const DOCTOR_A: Caller = Caller::new("u-doctor-a", Role::Doctor, "org-A");
pub const NURSE_A: Caller = Caller::new("u-nurse-a", Role::Nurse, "org-A");
pub const RECEPTIONIST_B: Caller = Caller::new("u-recept-b", Role::Receptionist, "org-B");
pub const ORPHAN_RECEPTIONIST: Caller = Caller::without_org("u-orphan", Role::Receptionist);

/// Adds caller headers to a test request.
pub trait WithCaller {
    fn as_caller(self, caller: &Caller) -> Self;
}

impl WithCaller for TestRequest {
    fn as_caller(self, caller: &Caller) -> Self {
        let request = self
            .add_header(X_AUTHENTICATED_USER_ID.clone(), header_value(caller.id))
            .add_header(X_AUTHENTICATED_ROLE.clone(), header_value(caller.role.as_str()));
        match caller.org {
            Some(org) => request.add_header(X_AUTHENTICATED_ORG_ID.clone(), header_value(org)),
            None => request,
        }
    }
}

pub fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).expect("valid header value")
}

pub fn header_name(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

/// Echoes the access scope and the query the handler sees.
async fn echo(scope: AccessScope, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "action": scope.action(),
        "userId": scope.principal().id,
        "effectiveOrgId": scope.effective_org(),
        "query": query,
    }))
}

/// Echoes the scope, the query and the JSON body the handler sees.
async fn echo_body(
    scope: AccessScope,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    Json(json!({
        "action": scope.action(),
        "userId": scope.principal().id,
        "effectiveOrgId": scope.effective_org(),
        "query": query,
        "body": body,
    }))
}

/// Domain handlers for a handful of routes of the standard table.
pub fn echo_routes() -> Router<AppState> {
    Router::new()
        .route("/api/patients", get(echo).post(echo_body))
        .route("/api/patients/{id}", get(echo))
        .route("/api/organizations", get(echo))
        .route("/api/organizations/{id}", get(echo).patch(echo_body))
        .route("/api/lab/tests/{id}/sample", patch(echo))
        .route("/api/radiology/tests/{id}", patch(echo))
        .route("/api/users/{id}", get(echo))
        .route("/api/dashboard/superadmin", get(echo))
}

pub fn state_with(config: ServerConfig, table: &RouteTable) -> AppState {
    AppState::new(
        config,
        Arc::new(PermissionCatalog::standard()),
        table,
        Arc::new(TrustedHeaderVerifier::new()),
    )
    .expect("route table compiles")
}

pub fn server_for(state: AppState, domain: Router<AppState>) -> TestServer {
    TestServer::new(create_app(state, domain)).expect("Failed to create test server")
}

/// Standard table, test configuration, echo handlers.
pub fn echo_server() -> TestServer {
    echo_server_with(ServerConfig::for_testing())
}

pub fn echo_server_with(config: ServerConfig) -> TestServer {
    server_for(state_with(config, &RouteTable::standard()), echo_routes())
}

/// Standard table with the `501` placeholder handlers.
pub fn placeholder_server() -> TestServer {
    let app = hms_rest::create_app_with_config(ServerConfig::for_testing(), RouteTable::standard())
        .expect("standard table compiles");
    TestServer::new(app).expect("Failed to create test server")
}
