//! Requested organization resolution from multiple sources.
//!
//! Provides the [`OrgResolver`] which finds the organization a request asks
//! for. The access layer hands the result to the tenant scope rule; the
//! resolver itself never decides anything.

use std::collections::HashMap;

use hms_access::OrgId;
use serde_json::Value;

use super::source::OrgSource;

/// Name of the query parameter and body field carrying the organization id.
pub const ORG_ID_FIELD: &str = "orgId";

/// The parts of a request that may name an organization.
#[derive(Debug, Clone, Copy)]
pub struct OrgInput<'a> {
    /// Raw query string, without the leading `?`.
    pub query: Option<&'a str>,
    /// Parsed JSON body, when the request carried one.
    pub body: Option<&'a Value>,
    /// Path parameters of the matched route.
    pub params: &'a HashMap<String, String>,
    /// Name of the path parameter holding an organization id, if the route has one.
    pub path_param: Option<&'a str>,
}

/// Result of resolving the requested organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOrg {
    /// The organization id from the highest-priority source, if any.
    pub org_id: Option<OrgId>,
    /// The source it came from.
    pub source: Option<OrgSource>,
    /// Every source that provided an id, in priority order.
    pub all_sources: Vec<(OrgSource, OrgId)>,
}

impl ResolvedOrg {
    /// Returns `true` if no source named an organization.
    pub fn is_empty(&self) -> bool {
        self.org_id.is_none()
    }

    /// Returns the ids named by every source below the primary one.
    pub fn other_orgs(&self) -> impl Iterator<Item = &OrgId> {
        self.all_sources.iter().skip(1).map(|(_, org)| org)
    }

    /// Consumes the result and returns the requested organization id.
    pub fn into_org_id(self) -> Option<OrgId> {
        self.org_id
    }
}

/// Extracts a requested organization id from one source.
pub trait OrgSourceExtractor: Send + Sync {
    /// Attempts to extract an organization id.
    fn extract(&self, input: &OrgInput<'_>) -> Option<OrgId>;

    /// Returns the source type this extractor handles.
    fn source_type(&self) -> OrgSource;
}

/// Extracts the `orgId` query parameter. The first occurrence wins.
#[derive(Debug, Default)]
pub struct QueryOrgExtractor;

impl OrgSourceExtractor for QueryOrgExtractor {
    fn extract(&self, input: &OrgInput<'_>) -> Option<OrgId> {
        let query = input.query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == ORG_ID_FIELD)
            .and_then(|(_, value)| non_empty(value.into_owned()))
    }

    fn source_type(&self) -> OrgSource {
        OrgSource::Query
    }
}

/// Extracts the top-level `orgId` of a JSON object body.
///
/// Numeric ids are accepted and rendered in decimal.
#[derive(Debug, Default)]
pub struct BodyOrgExtractor;

impl OrgSourceExtractor for BodyOrgExtractor {
    fn extract(&self, input: &OrgInput<'_>) -> Option<OrgId> {
        match input.body?.get(ORG_ID_FIELD)? {
            Value::String(s) => non_empty(s.clone()),
            Value::Number(n) => Some(OrgId::new(n.to_string())),
            _ => None,
        }
    }

    fn source_type(&self) -> OrgSource {
        OrgSource::Body
    }
}

/// Extracts the route's organization path parameter.
#[derive(Debug, Default)]
pub struct PathOrgExtractor;

impl OrgSourceExtractor for PathOrgExtractor {
    fn extract(&self, input: &OrgInput<'_>) -> Option<OrgId> {
        let name = input.path_param?;
        input
            .params
            .get(name)
            .and_then(|value| non_empty(value.clone()))
    }

    fn source_type(&self) -> OrgSource {
        OrgSource::Path
    }
}

fn non_empty(value: String) -> Option<OrgId> {
    if value.is_empty() {
        None
    } else {
        Some(OrgId::new(value))
    }
}

/// Resolves the requested organization from every configured source.
pub struct OrgResolver {
    extractors: Vec<Box<dyn OrgSourceExtractor>>,
}

impl OrgResolver {
    /// Creates a resolver checking query, body and path, in that order.
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(QueryOrgExtractor),
                Box::new(BodyOrgExtractor),
                Box::new(PathOrgExtractor),
            ],
        }
    }

    /// Resolves the requested organization.
    pub fn resolve(&self, input: &OrgInput<'_>) -> ResolvedOrg {
        let mut all_sources: Vec<(OrgSource, OrgId)> = self
            .extractors
            .iter()
            .filter_map(|extractor| {
                extractor
                    .extract(input)
                    .map(|org| (extractor.source_type(), org))
            })
            .collect();
        all_sources.sort_by(|a, b| b.0.cmp(&a.0));

        match all_sources.first().cloned() {
            Some((source, org_id)) => ResolvedOrg {
                org_id: Some(org_id),
                source: Some(source),
                all_sources,
            },
            None => ResolvedOrg::default(),
        }
    }
}

impl Default for OrgResolver {
    fn default() -> Self {
        Self::new()
    }
}
