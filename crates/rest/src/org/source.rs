//! Requested organization source identification.

use std::fmt;

/// Where in the request a requested organization id was found.
///
/// Sources are listed in priority order (highest to lowest):
/// 1. `orgId` query parameter
/// 2. `orgId` field of a JSON body
/// 3. Route path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrgSource {
    /// `?orgId=` query parameter (highest priority).
    Query,
    /// Top-level `orgId` of a JSON request body.
    Body,
    /// Path parameter of the matched route (lowest priority).
    Path,
}

impl OrgSource {
    /// Returns the priority of this source (higher = more authoritative).
    pub fn priority(&self) -> u8 {
        match self {
            OrgSource::Query => 3,
            OrgSource::Body => 2,
            OrgSource::Path => 1,
        }
    }

    /// Returns the source name used in logs and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgSource::Query => "query",
            OrgSource::Body => "body",
            OrgSource::Path => "path",
        }
    }
}

impl fmt::Display for OrgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for OrgSource {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for OrgSource {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority() {
        assert!(OrgSource::Query > OrgSource::Body);
        assert!(OrgSource::Body > OrgSource::Path);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(OrgSource::Query.to_string(), "query");
        assert_eq!(OrgSource::Body.to_string(), "body");
        assert_eq!(OrgSource::Path.to_string(), "path");
    }
}
