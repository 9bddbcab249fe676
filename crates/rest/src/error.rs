//! Error types for the hospital management API.
//!
//! Every failure leaving the HTTP layer is rendered with the same body shape:
//!
//! ```json
//! { "errors": [ { "message": "Access denied. Insufficient permissions.",
//!                 "requiredRoles": ["SuperAdmin", "HospitalAdmin", "Radiologist"],
//!                 "userRole": "Nurse" } ] }
//! ```
//!
//! # Error Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | `Access(Unauthenticated)` | 401 |
//! | `Access(InsufficientRole \| NotResourceOwner \| NoOrganizationAssigned \| CrossTenantAccess)` | 403 |
//! | `InvalidCredential` | 403 |
//! | `BadRequest`, `OrganizationMismatch` | 400 |
//! | `PayloadTooLarge` | 413 |
//! | `NotImplemented` | 501 |
//! | `Access(UnknownPermissionGroup)`, `RouteNotConfigured`, `InternalError` | 500 |
//!
//! Server-class failures are logged with their detail and answered with a
//! generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hms_access::AccessError;
use serde_json::{Map, Value, json};
use std::fmt;
use tracing::error;

use crate::org::OrgMismatchError;

/// Message returned for configuration faults in the access layer.
pub const INVALID_PERMISSION_CONFIGURATION: &str =
    "Internal server error: Invalid permission configuration";

/// Message returned when a presented credential does not verify.
pub const INVALID_CREDENTIAL: &str = "Invalid or expired token";

/// The primary error type for HTTP operations.
#[derive(Debug)]
pub enum RestError {
    /// An access decision denied or faulted.
    Access(AccessError),

    /// A credential was presented but could not be verified (HTTP 403).
    InvalidCredential {
        /// Why verification failed. Logged, never returned.
        reason: String,
    },

    /// Bad request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Organization sources disagree in strict mode (HTTP 400).
    OrganizationMismatch(OrgMismatchError),

    /// Request body exceeds the configured limit (HTTP 413).
    PayloadTooLarge {
        /// The limit in bytes.
        limit: usize,
    },

    /// A guarded route has no access policy (HTTP 500).
    RouteNotConfigured {
        /// Request method.
        method: String,
        /// Matched route template.
        path: String,
    },

    /// Not implemented (HTTP 501).
    NotImplemented {
        /// Description of what's not implemented.
        feature: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message. Logged, never returned.
        message: String,
    },
}

impl RestError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Access(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            RestError::InvalidCredential { .. } => StatusCode::FORBIDDEN,
            RestError::BadRequest { .. } | RestError::OrganizationMismatch(_) => {
                StatusCode::BAD_REQUEST
            }
            RestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RestError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            RestError::RouteNotConfigured { .. } | RestError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the client-facing message and diagnostic fields.
    fn body_fields(&self) -> (String, Map<String, Value>) {
        match self {
            RestError::Access(err) if err.is_server_fault() => {
                (INVALID_PERMISSION_CONFIGURATION.to_string(), Map::new())
            }
            RestError::Access(err) => (err.to_string(), err.diagnostics()),
            RestError::InvalidCredential { .. } => (INVALID_CREDENTIAL.to_string(), Map::new()),
            RestError::BadRequest { message } => (message.clone(), Map::new()),
            RestError::OrganizationMismatch(err) => {
                let mut fields = Map::new();
                fields.insert("orgIdSources".into(), err.to_sources_json());
                ("Conflicting organization ids in request".to_string(), fields)
            }
            RestError::PayloadTooLarge { limit } => (
                format!("Request body exceeds {} bytes", limit),
                Map::new(),
            ),
            RestError::RouteNotConfigured { .. } => {
                (INVALID_PERMISSION_CONFIGURATION.to_string(), Map::new())
            }
            RestError::NotImplemented { feature } => (
                format!("Feature '{}' is not implemented", feature),
                Map::new(),
            ),
            RestError::InternalError { .. } => ("Internal server error".to_string(), Map::new()),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::Access(err) => write!(f, "{}", err),
            RestError::InvalidCredential { reason } => {
                write!(f, "Invalid credential: {}", reason)
            }
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::OrganizationMismatch(err) => write!(f, "{}", err),
            RestError::PayloadTooLarge { limit } => {
                write!(f, "Payload too large (limit {} bytes)", limit)
            }
            RestError::RouteNotConfigured { method, path } => {
                write!(f, "No access policy for {} {}", method, path)
            }
            RestError::NotImplemented { feature } => write!(f, "Not implemented: {}", feature),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(error = %self, "Request failed with server error");
        }

        let (message, diagnostics) = self.body_fields();
        (status, Json(error_body(message, diagnostics))).into_response()
    }
}

/// Builds the `{ "errors": [ { "message", ... } ] }` body.
pub fn error_body(message: impl Into<String>, diagnostics: Map<String, Value>) -> Value {
    let mut entry = Map::new();
    entry.insert("message".into(), Value::String(message.into()));
    entry.extend(diagnostics);
    json!({ "errors": [Value::Object(entry)] })
}

impl From<AccessError> for RestError {
    fn from(err: AccessError) -> Self {
        RestError::Access(err)
    }
}

impl From<OrgMismatchError> for RestError {
    fn from(err: OrgMismatchError) -> Self {
        RestError::OrganizationMismatch(err)
    }
}

/// Result type alias for HTTP operations.
pub type RestResult<T> = Result<T, RestError>;
