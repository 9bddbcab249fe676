//! API route configuration.
//!
//! Defines the probe routes, the built-in user routes and the guarded domain
//! routes, and wires the authentication and access layers around the latter.

use axum::{
    Router,
    middleware,
    routing::{MethodFilter, get, on},
};

use crate::handlers;
use crate::middleware::{access_middleware, authenticate_middleware};
use crate::policy::{RouteMethod, RouteTable};
use crate::state::AppState;

/// Creates all API routes.
///
/// `domain` holds the handlers for the routes of the domain route table. Every
/// route in it must have a policy in `state`; a request to one that does not
/// is answered with `500`.
///
/// # Routes
///
/// ## Probes (no credentials)
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe
///
/// ## Built-in (guarded)
/// - `GET /users/me` - The calling user
/// - `GET /api/users/roles/available` - Roles the caller may assign
/// - `GET /api/access/permissions` - Permission groups of the caller's role
///
/// ## Domain (guarded)
/// - everything in `domain`
pub fn create_routes(state: AppState, domain: Router<AppState>) -> Router {
    let guarded = Router::new()
        .route("/users/me", get(handlers::me_handler))
        .route(
            "/api/users/roles/available",
            get(handlers::roles_available_handler),
        )
        .route(
            "/api/access/permissions",
            get(handlers::permissions_handler),
        )
        .merge(domain)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler))
        .merge(guarded)
        .with_state(state)
}

/// Mounts the `501` placeholder handler on every route of `table`.
pub fn placeholder_routes(table: &RouteTable) -> Router<AppState> {
    table.routes().iter().fold(Router::new(), |router, rule| {
        router.route(
            &rule.path,
            on(method_filter(rule.method), handlers::not_implemented_handler),
        )
    })
}

fn method_filter(method: RouteMethod) -> MethodFilter {
    match method {
        RouteMethod::Get => MethodFilter::GET,
        RouteMethod::Post => MethodFilter::POST,
        RouteMethod::Put => MethodFilter::PUT,
        RouteMethod::Patch => MethodFilter::PATCH,
        RouteMethod::Delete => MethodFilter::DELETE,
    }
}
