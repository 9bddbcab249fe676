//! HTTP request handlers.
//!
//! - [`health`] - Health, liveness and readiness probes
//! - [`users`] - The calling user, assignable roles and permission groups
//! - [`placeholder`] - `501` stand-in for unmounted domain routes

pub mod health;
pub mod placeholder;
pub mod users;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use placeholder::not_implemented_handler;
pub use users::{me_handler, permissions_handler, roles_available_handler};
