//! Route access policy.
//!
//! Which capability each HTTP route requires is configuration data, not code.
//! A [`RouteTable`] lists [`RouteRule`]s: method, axum route template, a
//! [`RouteGuard`], and whether tenant scope is enforced. The table is compiled
//! once at startup into [`CompiledRoutes`], which the access middleware
//! consults by matched route template.
//!
//! # Guards
//!
//! | JSON `type` | Check |
//! |-------------|-------|
//! | `authenticated` | any principal |
//! | `permission` | membership in a catalog group |
//! | `roles` | explicit role list |
//! | `admin` | either administrative tier |
//! | `super_admin` | super-tier only |
//! | `owner_or_admin` | admin tiers, or the user named by a path parameter |
//!
//! Tables loaded from disk should be checked with [`RouteTable::validate`]
//! before serving; a table with an unknown group still compiles, and requests
//! to the affected routes fail with a configuration fault.

mod compiled;
mod error;
mod rule;
mod table;

pub use compiled::{CompiledRoutes, RoutePolicy};
pub use error::PolicyError;
pub use rule::{RouteGuard, RouteMethod, RouteRule};
pub use table::RouteTable;
