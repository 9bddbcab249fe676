//! Route configuration for the hospital management API.
//!
//! This module contains the routing configuration that maps HTTP paths
//! to handlers and access layers.

pub mod api_routes;

pub use api_routes::{create_routes, placeholder_routes};
