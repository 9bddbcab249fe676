//! Server configuration for the hospital management API.
//!
//! This module provides configuration types for the HTTP access layer,
//! supporting both programmatic configuration and environment variable
//! overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HMS_SERVER_PORT` | 5000 | Server port |
//! | `HMS_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `HMS_LOG_LEVEL` | info | Log level |
//! | `HMS_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `HMS_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `HMS_ENABLE_CORS` | true | Enable CORS |
//! | `HMS_CORS_ORIGINS` | * | Allowed origins |
//! | `HMS_CORS_METHODS` | GET,POST,PUT,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `HMS_CORS_HEADERS` | Content-Type,Authorization,Accept,X-Request-Id | Allowed headers |
//! | `HMS_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//! | `HMS_AUDIT_ACCESS` | true | Emit an audit event per access decision |
//! | `HMS_STRICT_ORG_VALIDATION` | false | Reject requests whose organization sources disagree |
//! | `HMS_ROUTE_POLICY_FILE` | (none) | JSON route policy table replacing the built-in one |
//!
//! # Example
//!
//! ```rust
//! use hms_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     strict_org_validation: true,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Server configuration for the hospital management API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "HMS_SERVER_PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HMS_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HMS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "HMS_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "HMS_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "HMS_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "HMS_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "HMS_CORS_METHODS",
        default_value = "GET,POST,PUT,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "HMS_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,X-Request-Id"
    )]
    pub cors_headers: String,

    /// Enable request ID tracking.
    #[arg(long, env = "HMS_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Emit one `audit` tracing event per access decision.
    #[arg(long, env = "HMS_AUDIT_ACCESS", default_value = "true")]
    pub audit_access: bool,

    /// Reject requests whose query, body and path name different organizations.
    #[arg(long, env = "HMS_STRICT_ORG_VALIDATION", default_value = "false")]
    pub strict_org_validation: bool,

    /// Route policy table to load instead of the built-in one.
    #[arg(long, env = "HMS_ROUTE_POLICY_FILE")]
    pub route_policy_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,X-Request-Id".to_string(),
            enable_request_id: true,
            audit_access: true,
            strict_org_validation: false,
            route_policy_file: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse_from(["hms"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if let Some(path) = &self.route_policy_file {
            if !path.is_file() {
                errors.push(format!(
                    "Route policy file not found: {}",
                    path.display()
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 64 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            enable_request_id: false,
            audit_access: true,
            strict_org_validation: false,
            route_policy_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.enable_cors);
        assert!(config.audit_access);
        assert!(!config.strict_org_validation);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| e.contains("Port")));
    }

    #[test]
    fn test_validate_unknown_log_level() {
        let config = ServerConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("verbose")));
    }

    #[test]
    fn test_validate_missing_policy_file() {
        let config = ServerConfig {
            route_policy_file: Some(PathBuf::from("/nonexistent/routes.json")),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Route policy file")));
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = ServerConfig {
            port: 0,
            max_body_size: 0,
            request_timeout: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().len(), 3);
    }

    #[test]
    fn test_parse_flags() {
        let config =
            ServerConfig::try_parse_from(["hms", "--port", "8081", "--strict-org-validation"])
                .unwrap();
        assert_eq!(config.port, 8081);
        assert!(config.strict_org_validation);
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
        assert!(!config.enable_request_id);
    }
}
