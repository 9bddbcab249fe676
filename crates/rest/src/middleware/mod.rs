//! HTTP middleware for the hospital management API.
//!
//! - [`authenticate`] - Credential verification
//! - [`access`] - Route access decisions and tenant scope binding

pub mod access;
pub mod authenticate;

pub use access::access_middleware;
pub use authenticate::authenticate_middleware;
