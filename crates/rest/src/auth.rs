//! Credential verification.
//!
//! Turning a bearer credential into a [`Principal`] is a seam: this crate
//! never issues or signs tokens. A [`CredentialVerifier`] looks at request
//! headers and answers one of three ways:
//!
//! - `Ok(Some(principal))` - a credential was presented and verified
//! - `Ok(None)` - no credential was presented
//! - `Err(_)` - a credential was presented but did not verify
//!
//! [`TrustedHeaderVerifier`] reads an identity already established by an
//! authenticating gateway in front of this service.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName};
use hms_access::{Principal, Role};
use thiserror::Error;

/// Header carrying the authenticated user id.
pub static X_AUTHENTICATED_USER_ID: HeaderName =
    HeaderName::from_static("x-authenticated-user-id");

/// Header carrying the authenticated user's role name.
pub static X_AUTHENTICATED_ROLE: HeaderName = HeaderName::from_static("x-authenticated-role");

/// Header carrying the authenticated user's organization id.
pub static X_AUTHENTICATED_ORG_ID: HeaderName =
    HeaderName::from_static("x-authenticated-org-id");

/// Why a presented credential was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("header {header} is not valid UTF-8")]
    MalformedHeader { header: String },

    #[error("credential has no role")]
    MissingRole,

    #[error("credential names unknown role '{role}'")]
    UnknownRole { role: String },

    #[error("credential rejected: {reason}")]
    Rejected { reason: String },
}

/// Verifies request credentials.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the principal for the request's credential, if one was presented.
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<Principal>, CredentialError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Reads the identity forwarded by a trusted authentication gateway.
///
/// The user id header decides whether a credential was presented at all. The
/// role header is then required; the organization header is optional so that
/// organization-agnostic roles can be forwarded without one.
#[derive(Debug, Clone)]
pub struct TrustedHeaderVerifier {
    user_header: HeaderName,
    role_header: HeaderName,
    org_header: HeaderName,
}

impl TrustedHeaderVerifier {
    /// Creates a verifier reading the default `x-authenticated-*` headers.
    pub fn new() -> Self {
        Self {
            user_header: X_AUTHENTICATED_USER_ID.clone(),
            role_header: X_AUTHENTICATED_ROLE.clone(),
            org_header: X_AUTHENTICATED_ORG_ID.clone(),
        }
    }

    /// Creates a verifier reading custom header names.
    pub fn with_headers(user: HeaderName, role: HeaderName, org: HeaderName) -> Self {
        Self {
            user_header: user,
            role_header: role,
            org_header: org,
        }
    }
}

impl Default for TrustedHeaderVerifier {
    fn default() -> Self {
        Self::new()
    }
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &HeaderName,
) -> Result<Option<&'a str>, CredentialError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| CredentialError::MalformedHeader {
                header: name.as_str().to_string(),
            }),
    }
}

#[async_trait]
impl CredentialVerifier for TrustedHeaderVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<Principal>, CredentialError> {
        let Some(user_id) = header_str(headers, &self.user_header)? else {
            return Ok(None);
        };

        let role_name = header_str(headers, &self.role_header)?.ok_or(CredentialError::MissingRole)?;
        let role: Role = role_name.parse().map_err(|_| CredentialError::UnknownRole {
            role: role_name.to_string(),
        })?;

        let principal = match header_str(headers, &self.org_header)? {
            Some(org) => Principal::new(user_id, role, org),
            None => Principal::unscoped(user_id, role),
        };
        Ok(Some(principal))
    }

    fn name(&self) -> &'static str {
        "trusted-header"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use hms_access::OrgId;

    fn headers(pairs: &[(&HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert((*name).clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[tokio::test]
    async fn test_no_credential() {
        let verifier = TrustedHeaderVerifier::new();
        assert_eq!(verifier.verify(&HeaderMap::new()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_scoped_principal() {
        let verifier = TrustedHeaderVerifier::new();
        let principal = verifier
            .verify(&headers(&[
                (&X_AUTHENTICATED_USER_ID, "u42"),
                (&X_AUTHENTICATED_ROLE, "Nurse"),
                (&X_AUTHENTICATED_ORG_ID, "org-1"),
            ]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(principal.id, "u42");
        assert_eq!(principal.role, Role::Nurse);
        assert_eq!(principal.organization_id(), Some(&OrgId::new("org-1")));
    }

    #[tokio::test]
    async fn test_principal_without_org() {
        let verifier = TrustedHeaderVerifier::new();
        let principal = verifier
            .verify(&headers(&[
                (&X_AUTHENTICATED_USER_ID, "u9"),
                (&X_AUTHENTICATED_ROLE, "SuperAdmin"),
            ]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.organization_id(), None);
    }

    #[tokio::test]
    async fn test_missing_role_is_rejected() {
        let verifier = TrustedHeaderVerifier::new();
        let result = verifier
            .verify(&headers(&[(&X_AUTHENTICATED_USER_ID, "u1")]))
            .await;
        assert_eq!(result, Err(CredentialError::MissingRole));
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let verifier = TrustedHeaderVerifier::new();
        let result = verifier
            .verify(&headers(&[
                (&X_AUTHENTICATED_USER_ID, "u1"),
                (&X_AUTHENTICATED_ROLE, "Janitor"),
            ]))
            .await;
        assert_eq!(
            result,
            Err(CredentialError::UnknownRole {
                role: "Janitor".into()
            })
        );
    }

    #[tokio::test]
    async fn test_custom_headers() {
        let verifier = TrustedHeaderVerifier::with_headers(
            HeaderName::from_static("x-user"),
            HeaderName::from_static("x-role"),
            HeaderName::from_static("x-org"),
        );
        let mut map = HeaderMap::new();
        map.insert("x-user", HeaderValue::from_static("u3"));
        map.insert("x-role", HeaderValue::from_static("HRManager"));

        let principal = verifier.verify(&map).await.unwrap().unwrap();
        assert_eq!(principal.role, Role::HrManager);
        assert_eq!(verifier.name(), "trusted-header");
    }
}
