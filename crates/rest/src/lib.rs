//! # hms-rest - Access-Controlled HTTP Layer for the Hospital Management API
//!
//! This crate puts the role-based access and tenant isolation rules of
//! [`hms_access`] in front of an Axum router. Every guarded route is bound to
//! a policy in a declarative route table; requests are authenticated, checked
//! against that policy, and bound to the caller's organization before any
//! handler runs.
//!
//! ## Features
//!
//! - **Declarative Route Policies**: One table maps each `(method, path)` to a guard
//! - **Fail-Closed Routing**: A guarded route without a policy answers `500`
//! - **Tenant Binding**: The `orgId` query parameter is rewritten to the effective organization
//! - **Pluggable Credentials**: Identities come from a [`CredentialVerifier`](auth::CredentialVerifier)
//! - **Audit Events**: Every decision is recorded on the `audit` tracing target
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hms_rest::{AppState, ServerConfig, create_app, routing::placeholder_routes};
//! use hms_rest::policy::RouteTable;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let state = AppState::standard(config)?;
//!
//!     let app = create_app(state, placeholder_routes(&RouteTable::standard()));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Guards
//!
//! | Guard | Allows |
//! |-------|--------|
//! | `authenticated` | any authenticated principal |
//! | `permission` | roles of a named permission group |
//! | `roles` | an explicit list of roles |
//! | `admin` | the super-tier and hospital administrators |
//! | `super_admin` | the super-tier only |
//! | `owner_or_admin` | the user named by a path parameter, or the admin tier |
//!
//! Scoped routes additionally enforce tenant isolation after the guard.
//!
//! ## Error Handling
//!
//! All errors are returned as `{ "errors": [ { "message": ... } ] }`:
//!
//! | HTTP Status | Description |
//! |-------------|-------------|
//! | 400 | Conflicting organization ids (strict mode) |
//! | 401 | Authentication required |
//! | 403 | Role not allowed, cross-tenant access, no organization, invalid credential |
//! | 413 | Request body too large |
//! | 500 | Invalid permission configuration |
//! | 501 | Domain route not mounted |
//!
//! ## Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HMS_SERVER_PORT` | 5000 | Server port |
//! | `HMS_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `HMS_LOG_LEVEL` | info | Log level (error, warn, info, debug, trace) |
//! | `HMS_MAX_BODY_SIZE` | 10485760 | Max request body size (bytes) |
//! | `HMS_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `HMS_ENABLE_CORS` | true | Enable CORS |
//! | `HMS_CORS_ORIGINS` | * | Allowed CORS origins |
//! | `HMS_AUDIT_ACCESS` | true | Record access decisions |
//! | `HMS_STRICT_ORG_VALIDATION` | false | Reject disagreeing organization ids |
//! | `HMS_ROUTE_POLICY_FILE` | | JSON route table replacing the built-in one |
//!
//! ## Architecture
//!
//! - [`auth`] - Credential verification
//! - [`config`] - Server configuration
//! - [`error`] - Error types and JSON error bodies
//! - [`extractors`] - The [`AccessScope`](extractors::AccessScope) extractor
//! - [`handlers`] - Probe and user handlers
//! - [`middleware`] - Authentication and access layers
//! - [`org`] - Requested organization resolution
//! - [`policy`] - Route tables and compiled route policies
//! - [`routing`] - Route configuration
//! - [`state`] - Application state

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod org;
pub mod policy;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::policy::{PolicyError, RouteTable};

/// Creates the Axum application.
///
/// `domain` holds the handlers for the domain routes of the table `state`
/// was built from. Use [`routing::placeholder_routes`] to serve every domain
/// route with `501` until the real handlers are mounted.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get};
/// use hms_rest::{AppState, ServerConfig, create_app};
///
/// let state = AppState::standard(ServerConfig::default())?;
/// let domain = Router::new().route("/api/patients", get(list_patients));
/// let app = create_app(state, domain);
/// ```
pub fn create_app(state: AppState, domain: Router<AppState>) -> Router {
    let config = state.config().clone();
    info!(
        routes = state.routes().len(),
        groups = state.catalog().len(),
        verifier = state.verifier().name(),
        "Creating hospital management API"
    );

    let router = routing::create_routes(state, domain)
        .layer(DefaultBodyLimit::max(config.max_body_size));

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    let router = router.layer(service_builder);

    if config.enable_request_id {
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    } else {
        router
    }
}

/// Creates the application with the standard catalog, the given route table
/// and the `501` placeholder handlers.
///
/// # Errors
///
/// Returns a [`PolicyError`] if the table repeats a route.
pub fn create_app_with_config(config: ServerConfig, table: RouteTable) -> Result<Router, PolicyError> {
    let state = AppState::new(
        config,
        std::sync::Arc::new(hms_access::PermissionCatalog::standard()),
        &table,
        std::sync::Arc::new(auth::TrustedHeaderVerifier::new()),
    )?;
    Ok(create_app(state, routing::placeholder_routes(&table)))
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. Audit events are
/// always kept at `info` on the `audit` target.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hms_rest={level},hms_access={level},hms={level},audit=info,tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Resolves when the process receives Ctrl+C.
///
/// Pass to `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
