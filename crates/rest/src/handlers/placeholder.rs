//! Stand-in handler for guarded domain routes.
//!
//! The domain services behind the route table live outside this crate. Until
//! one is mounted, a route answers `501 Not Implemented`, but only after the
//! access layer has allowed the request, so the full access surface can be
//! exercised end to end.

use crate::error::RestError;
use crate::extractors::AccessScope;

/// Rejects an allowed request with `501 Not Implemented`.
pub async fn not_implemented_handler(scope: AccessScope) -> RestError {
    RestError::NotImplemented {
        feature: scope.action().to_string(),
    }
}
