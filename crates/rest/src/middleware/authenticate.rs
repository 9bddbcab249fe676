//! Authentication middleware.
//!
//! Runs the configured [`CredentialVerifier`](crate::auth::CredentialVerifier)
//! and attaches the resulting [`Principal`] to the request extensions. A
//! request without a credential passes through unauthenticated; the access
//! layer decides whether the route needs one.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hms_access::Principal;
use tracing::{debug, warn};

use crate::error::RestError;
use crate::state::AppState;

/// Middleware function for credential verification.
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn authenticate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RestError> {
    let verified = state.verifier().verify(request.headers()).await;

    match verified {
        Ok(Some(principal)) => {
            debug!(
                user_id = %principal.id,
                role = %principal.role,
                "Authenticated request"
            );
            request.extensions_mut().insert::<Principal>(principal);
        }
        Ok(None) => {}
        Err(err) => {
            warn!(
                verifier = state.verifier().name(),
                path = %request.uri().path(),
                error = %err,
                "Credential verification failed"
            );
            return Err(RestError::InvalidCredential {
                reason: err.to_string(),
            });
        }
    }

    Ok(next.run(request).await)
}
