//! Health check endpoint handlers.
//!
//! These routes sit outside the access layer and never require credentials.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Server is healthy
pub async fn health_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "service": "hms",
        "permissionGroups": state.catalog().len(),
        "guardedRoutes": state.routes().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Handler for the liveness probe.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Handler for the readiness probe.
///
/// Ready once the permission catalog and the route policies are loaded.
///
/// # HTTP Request
///
/// `GET [base]/_readiness`
///
/// # Response
///
/// - `200 OK` - Ready to serve
/// - `503 Service Unavailable` - Catalog or route policies are empty
pub async fn readiness_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("Processing readiness check request");

    let catalog_ok = !state.catalog().is_empty();
    let routes_ok = !state.routes().is_empty();
    let check = |ok: bool| if ok { "ok" } else { "empty" };

    let (status, label) = if catalog_ok && routes_ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let response = serde_json::json!({
        "status": label,
        "checks": {
            "permissionCatalog": check(catalog_ok),
            "routePolicies": check(routes_ok)
        }
    });

    Ok((status, Json(response)).into_response())
}
