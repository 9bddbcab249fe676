//! Requested organization resolution.
//!
//! A request may name the organization it wants to act on in three places:
//!
//! - **Query parameter**: `GET /api/patients?orgId=org-1`
//! - **JSON body**: `POST /api/patients` with `{ "orgId": "org-1", ... }`
//! - **Path parameter**: `GET /api/organizations/{id}` for routes that declare one
//!
//! # Resolution Priority
//!
//! When several sources provide an id, the highest-priority one is the
//! requested organization:
//!
//! 1. Query parameter
//! 2. JSON body
//! 3. Path parameter
//!
//! Precedence only picks a target for the super-tier. A tenant-bound
//! principal must own every id the request names, so a matching query cannot
//! cover a foreign id in the body or path.
//!
//! # Strict Validation
//!
//! When [`ServerConfig::strict_org_validation`](crate::ServerConfig::strict_org_validation)
//! is enabled, the access layer rejects requests whose sources name different
//! organizations instead of silently picking the highest-priority one.
//!
//! Resolution only finds what was asked for. Whether the caller may have it
//! is decided by the tenant scope rule in `hms_access`.

mod resolver;
mod source;
mod validation;

pub use resolver::{
    BodyOrgExtractor, ORG_ID_FIELD, OrgInput, OrgResolver, OrgSourceExtractor, PathOrgExtractor,
    QueryOrgExtractor, ResolvedOrg,
};
pub use source::OrgSource;
pub use validation::{OrgMismatchError, OrgValidator};
