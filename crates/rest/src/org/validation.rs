//! Requested organization validation for strict mode.

use hms_access::OrgId;
use serde_json::{Map, Value};

use super::resolver::ResolvedOrg;
use super::source::OrgSource;

/// Error when organization sources disagree in strict validation mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgMismatchError {
    /// The organization id from the primary source.
    pub primary_org: OrgId,
    /// The primary source.
    pub primary_source: OrgSource,
    /// Conflicting organization id.
    pub conflicting_org: OrgId,
    /// Source of the conflicting organization id.
    pub conflicting_source: OrgSource,
}

impl OrgMismatchError {
    /// Returns `{ "<source>": "<org id>", ... }` for the two disagreeing sources.
    pub fn to_sources_json(&self) -> Value {
        let mut sources = Map::new();
        sources.insert(
            self.primary_source.as_str().into(),
            Value::String(self.primary_org.as_str().to_string()),
        );
        sources.insert(
            self.conflicting_source.as_str().into(),
            Value::String(self.conflicting_org.as_str().to_string()),
        );
        Value::Object(sources)
    }
}

impl std::fmt::Display for OrgMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Organization mismatch: {} from {} conflicts with {} from {}",
            self.primary_org, self.primary_source, self.conflicting_org, self.conflicting_source
        )
    }
}

impl std::error::Error for OrgMismatchError {}

/// Validates organization consistency across sources.
pub struct OrgValidator;

impl OrgValidator {
    /// Validates that all sources agree on the organization id.
    ///
    /// Returns the first source that disagrees with the primary one.
    pub fn validate_consistency(resolved: &ResolvedOrg) -> Result<(), OrgMismatchError> {
        let Some((primary_source, primary_org)) = resolved.all_sources.first() else {
            return Ok(());
        };

        for (source, org) in resolved.all_sources.iter().skip(1) {
            if org != primary_org {
                return Err(OrgMismatchError {
                    primary_org: primary_org.clone(),
                    primary_source: *primary_source,
                    conflicting_org: org.clone(),
                    conflicting_source: *source,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(sources: &[(OrgSource, &str)]) -> ResolvedOrg {
        let all_sources: Vec<_> = sources
            .iter()
            .map(|(source, org)| (*source, OrgId::new(*org)))
            .collect();
        ResolvedOrg {
            org_id: all_sources.first().map(|(_, org)| org.clone()),
            source: all_sources.first().map(|(source, _)| *source),
            all_sources,
        }
    }

    #[test]
    fn test_validate_no_sources() {
        assert!(OrgValidator::validate_consistency(&ResolvedOrg::default()).is_ok());
    }

    #[test]
    fn test_validate_consistent_sources() {
        let resolved = resolved(&[(OrgSource::Query, "A"), (OrgSource::Body, "A")]);
        assert!(OrgValidator::validate_consistency(&resolved).is_ok());
    }

    #[test]
    fn test_validate_conflicting_sources() {
        let resolved = resolved(&[
            (OrgSource::Query, "A"),
            (OrgSource::Body, "A"),
            (OrgSource::Path, "B"),
        ]);

        let err = OrgValidator::validate_consistency(&resolved).unwrap_err();
        assert_eq!(err.primary_org, OrgId::new("A"));
        assert_eq!(err.primary_source, OrgSource::Query);
        assert_eq!(err.conflicting_org, OrgId::new("B"));
        assert_eq!(err.conflicting_source, OrgSource::Path);

        let sources = err.to_sources_json();
        assert_eq!(sources["query"], "A");
        assert_eq!(sources["path"], "B");
    }

    #[test]
    fn test_error_display() {
        let err = OrgMismatchError {
            primary_org: OrgId::new("A"),
            primary_source: OrgSource::Query,
            conflicting_org: OrgId::new("B"),
            conflicting_source: OrgSource::Body,
        };
        assert_eq!(
            err.to_string(),
            "Organization mismatch: A from query conflicts with B from body"
        );
    }
}
