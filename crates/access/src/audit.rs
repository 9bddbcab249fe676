//! Access audit records.
//!
//! Every access decision, allowed or not, can be recorded as one structured
//! `tracing` event with target `audit`. Recording is a side effect only: it
//! never changes a decision and cannot fail.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::AccessError;
use crate::org::OrgId;
use crate::principal::Principal;

/// Outcome of a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The request may proceed.
    Allowed,
    /// A client-class denial.
    Denied(&'static str),
    /// A server-class configuration fault.
    Fault(&'static str),
}

impl AccessOutcome {
    /// Derives the outcome from a decision.
    pub fn of<T>(decision: &Result<T, AccessError>) -> Self {
        match decision {
            Ok(_) => AccessOutcome::Allowed,
            Err(err) if err.is_server_fault() => AccessOutcome::Fault(err.kind()),
            Err(err) => AccessOutcome::Denied(err.kind()),
        }
    }

    /// Returns `"allow"`, `"deny"` or `"fault"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Allowed => "allow",
            AccessOutcome::Denied(_) => "deny",
            AccessOutcome::Fault(_) => "fault",
        }
    }

    /// Returns the failure kind, if any.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AccessOutcome::Allowed => None,
            AccessOutcome::Denied(kind) | AccessOutcome::Fault(kind) => Some(kind),
        }
    }
}

/// One audited access decision.
#[derive(Debug, Clone)]
pub struct AccessLogEntry<'a> {
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// The principal, if authenticated.
    pub principal: Option<&'a Principal>,
    /// The effective organization, falling back to the requested one.
    pub org_id: Option<&'a OrgId>,
    /// Name of the guarded action.
    pub action: &'a str,
    /// Request path.
    pub path: &'a str,
    /// Decision outcome.
    pub outcome: AccessOutcome,
}

impl<'a> AccessLogEntry<'a> {
    /// Creates an entry stamped with the current time.
    pub fn now(
        action: &'a str,
        path: &'a str,
        principal: Option<&'a Principal>,
        org_id: Option<&'a OrgId>,
        outcome: AccessOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            principal,
            org_id,
            action,
            path,
            outcome,
        }
    }

    /// Returns the principal id, or `anonymous`.
    pub fn user_id(&self) -> &str {
        self.principal.map_or("anonymous", |p| p.id.as_str())
    }

    /// Returns the role name, or `none`.
    pub fn role(&self) -> &'static str {
        self.principal.map_or("none", |p| p.role.as_str())
    }

    /// Returns the organization id, or `none`.
    ///
    /// Falls back to the principal's own organization when no id was
    /// recorded for the request.
    pub fn org(&self) -> &str {
        self.org_id
            .or_else(|| self.principal.and_then(Principal::organization_id))
            .map_or("none", OrgId::as_str)
    }
}

/// Emits one audit event for `entry`.
pub fn log_access(entry: &AccessLogEntry<'_>) {
    tracing::info!(
        target: "audit",
        event = "access",
        timestamp = %entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        action = entry.action,
        user_id = entry.user_id(),
        role = entry.role(),
        org_id = entry.org(),
        path = entry.path,
        outcome = entry.outcome.as_str(),
        reason = entry.outcome.reason().unwrap_or(""),
        "[RBAC] access decision"
    );
}
