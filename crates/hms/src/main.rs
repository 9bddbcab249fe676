//! Hospital Management Server (HMS)
//!
//! Serves the access-controlled hospital management API. Domain routes answer
//! `501` until their services are mounted; authentication, permission checks,
//! tenant binding and auditing are fully active.

use std::sync::Arc;

use clap::Parser;
use hms_access::PermissionCatalog;
use hms_rest::auth::TrustedHeaderVerifier;
use hms_rest::policy::RouteTable;
use hms_rest::routing::placeholder_routes;
use hms_rest::{AppState, ServerConfig, create_app, init_logging, shutdown_signal};
use tracing::{error, info};

/// Loads the route table from the configured file, or the built-in one.
fn load_route_table(config: &ServerConfig) -> anyhow::Result<RouteTable> {
    match &config.route_policy_file {
        Some(path) => {
            info!(path = %path.display(), "Loading route policy file");
            Ok(RouteTable::from_json_file(path)?)
        }
        None => Ok(RouteTable::standard()),
    }
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let catalog = Arc::new(PermissionCatalog::standard());
    let table = load_route_table(&config)?;

    // Every group a route names must exist before the first request arrives.
    if let Err(errors) = table.validate(&catalog) {
        for err in &errors {
            error!(error = %err, "Invalid route policy");
            eprintln!("Route policy error: {}", err);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        routes = table.len(),
        permission_groups = catalog.len(),
        strict_org_validation = config.strict_org_validation,
        audit = config.audit_access,
        "Starting hospital management server"
    );

    let domain = placeholder_routes(&table);
    let state = AppState::new(
        config.clone(),
        catalog,
        &table,
        Arc::new(TrustedHeaderVerifier::new()),
    )?;
    let app = create_app(state, domain);

    serve(app, &config).await
}
