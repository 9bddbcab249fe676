//! Application state for the hospital management API.
//!
//! This module defines the shared application state that is available to all
//! request handlers and middleware: the permission catalog, the compiled route
//! policies, the credential verifier and the server configuration. Everything
//! is immutable after startup and shared behind `Arc`s.

use std::sync::Arc;

use hms_access::PermissionCatalog;

use crate::auth::{CredentialVerifier, TrustedHeaderVerifier};
use crate::config::ServerConfig;
use crate::org::OrgResolver;
use crate::policy::{CompiledRoutes, PolicyError, RouteTable};

/// Shared application state for the HTTP layer.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use hms_access::PermissionCatalog;
/// use hms_rest::{AppState, ServerConfig};
/// use hms_rest::auth::TrustedHeaderVerifier;
/// use hms_rest::policy::RouteTable;
///
/// let state = AppState::new(
///     ServerConfig::default(),
///     Arc::new(PermissionCatalog::standard()),
///     &RouteTable::standard(),
///     Arc::new(TrustedHeaderVerifier::new()),
/// )
/// .unwrap();
/// assert!(state.routes().len() > RouteTable::standard().len());
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Permission groups, built once.
    catalog: Arc<PermissionCatalog>,

    /// Route policies for the system routes plus the domain table.
    routes: Arc<CompiledRoutes>,

    /// Credential verifier.
    verifier: Arc<dyn CredentialVerifier>,

    /// Requested organization resolver.
    resolver: Arc<OrgResolver>,
}

impl AppState {
    /// Creates a new AppState.
    ///
    /// `table` holds the domain routes; the routes served by this crate's own
    /// handlers are added automatically.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateRoute`] if `table` repeats a route or
    /// redefines a system route.
    pub fn new(
        config: ServerConfig,
        catalog: Arc<PermissionCatalog>,
        table: &RouteTable,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, PolicyError> {
        let routes = CompiledRoutes::compile(&RouteTable::system().extend(table.clone()))?;
        Ok(Self {
            config: Arc::new(config),
            catalog,
            routes: Arc::new(routes),
            verifier,
            resolver: Arc::new(OrgResolver::new()),
        })
    }

    /// Creates state with the standard catalog and route table, reading
    /// identities from trusted gateway headers.
    pub fn standard(config: ServerConfig) -> Result<Self, PolicyError> {
        Self::new(
            config,
            Arc::new(PermissionCatalog::standard()),
            &RouteTable::standard(),
            Arc::new(TrustedHeaderVerifier::new()),
        )
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the permission catalog.
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Returns the compiled route policies.
    pub fn routes(&self) -> &CompiledRoutes {
        &self.routes
    }

    /// Returns the credential verifier.
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }

    /// Returns the requested organization resolver.
    pub fn resolver(&self) -> &OrgResolver {
        &self.resolver
    }

    /// Returns whether access decisions are audited.
    pub fn audit_enabled(&self) -> bool {
        self.config.audit_access
    }

    /// Returns whether disagreeing organization sources are rejected.
    pub fn strict_org_validation(&self) -> bool {
        self.config.strict_org_validation
    }
}
