//! Axum extractors for access-controlled handlers.
//!
//! - [`AccessScope`] - The caller and the organization scope granted to them

mod access_scope;

pub use access_scope::AccessScope;
