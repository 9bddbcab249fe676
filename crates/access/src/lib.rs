//! # hms-access - Role-based access control and tenant isolation
//!
//! This crate is the decision core of the hospital management backend. It
//! answers two questions for every request, without any I/O:
//!
//! 1. **May this principal perform this capability?** Roles are mapped to
//!    named permission groups in an immutable [`PermissionCatalog`]; the
//!    [`Authorizer`] checks a [`Principal`] against a role set or group.
//! 2. **Which organization may the request touch?** [`enforce_scope`] keeps
//!    every principal inside its own organization (tenant) and computes the
//!    effective organization id handlers must use. Only organization-agnostic
//!    roles (the super-tier) may act across organizations.
//!
//! Rules compose into an [`AccessChain`], which short-circuits on the first
//! denial and always runs role checks before scope checks. Decisions can be
//! recorded with [`audit::log_access`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use hms_access::{AccessError, Authorizer, OrgId, PermissionCatalog, Principal, Role, enforce_scope};
//!
//! let authz = Authorizer::new(Arc::new(PermissionCatalog::standard()));
//! let nurse = Principal::new("u42", Role::Nurse, "org-1");
//!
//! assert!(authz.require_permission(Some(&nurse), "LAB_PROCESS").is_ok());
//! assert!(matches!(
//!     authz.require_permission(Some(&nurse), "RADIOLOGY_PROCESS"),
//!     Err(AccessError::InsufficientRole { .. })
//! ));
//!
//! let scope = enforce_scope(Some(&nurse), None).unwrap();
//! assert_eq!(scope.effective(), Some(&OrgId::new("org-1")));
//! ```
//!
//! ## Concurrency
//!
//! The catalog is built once at startup and never mutated, so it can be
//! shared behind an `Arc` without locking. All evaluation is synchronous and
//! allocation-light; there is nothing to cancel or clean up.

#![warn(missing_docs)]

pub mod audit;
pub mod chain;
pub mod error;
pub mod evaluator;
pub mod org;
pub mod permission;
pub mod principal;
pub mod role;
pub mod scope;

pub use chain::{AccessChain, AccessRequest, AccessRule, Grant, Phase};
pub use error::{AccessError, CatalogError, Decision};
pub use evaluator::Authorizer;
pub use org::OrgId;
pub use permission::{PermissionCatalog, PermissionGroup, RoleSet};
pub use principal::Principal;
pub use role::{Role, RoleCategory, is_known_role};
pub use scope::{OrgScope, effective_org_id, enforce_scope};
