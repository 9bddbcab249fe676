//! Route access rules as configuration data.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use hms_access::chain::{AdminTier, AnyRole, OwnerOrAdminTier, Permission, SuperTier};
use hms_access::{AccessRule, Role, RoleSet};
use serde::{Deserialize, Serialize};

/// HTTP methods a route rule can guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl RouteMethod {
    /// Returns the `http` method.
    pub fn as_method(&self) -> Method {
        match self {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Put => Method::PUT,
            RouteMethod::Patch => Method::PATCH,
            RouteMethod::Delete => Method::DELETE,
        }
    }

    /// Maps an `http` method, if it is one a rule can guard.
    pub fn from_method(method: &Method) -> Option<Self> {
        match method.as_str() {
            "GET" => Some(RouteMethod::Get),
            "POST" => Some(RouteMethod::Post),
            "PUT" => Some(RouteMethod::Put),
            "PATCH" => Some(RouteMethod::Patch),
            "DELETE" => Some(RouteMethod::Delete),
            _ => None,
        }
    }

    /// Returns the upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability check guarding a route.
///
/// Serialized with a `type` tag, e.g. `{"type": "permission", "group": "LAB_PROCESS"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteGuard {
    /// Any authenticated principal.
    Authenticated,
    /// Membership in a named permission group.
    Permission {
        /// Group name in the permission catalog.
        group: String,
    },
    /// An explicit role list.
    Roles {
        /// Allowed roles.
        roles: Vec<Role>,
    },
    /// Either administrative tier.
    Admin,
    /// The super-tier only.
    SuperAdmin,
    /// Administrative tiers, or the principal whose id is in a path parameter.
    OwnerOrAdmin {
        /// Path parameter holding the owner's user id.
        param: String,
    },
}

impl RouteGuard {
    /// Shorthand for [`RouteGuard::Permission`].
    pub fn permission(group: impl Into<String>) -> Self {
        RouteGuard::Permission {
            group: group.into(),
        }
    }

    /// Shorthand for [`RouteGuard::Roles`].
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        RouteGuard::Roles {
            roles: roles.into_iter().collect(),
        }
    }

    /// Builds the access rule for this guard.
    pub fn to_rule(&self) -> Arc<dyn AccessRule> {
        match self {
            RouteGuard::Authenticated => Arc::new(AnyRole(RoleSet::from(Role::ALL))),
            RouteGuard::Permission { group } => Arc::new(Permission::new(group.clone())),
            RouteGuard::Roles { roles } => Arc::new(AnyRole(roles.iter().copied().collect())),
            RouteGuard::Admin => Arc::new(AdminTier),
            RouteGuard::SuperAdmin => Arc::new(SuperTier),
            RouteGuard::OwnerOrAdmin { param } => Arc::new(OwnerOrAdminTier::path_param(param)),
        }
    }

    /// Returns the permission group this guard names, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            RouteGuard::Permission { group } => Some(group.as_str()),
            _ => None,
        }
    }
}

fn default_scoped() -> bool {
    true
}

/// One guarded route: method, axum route template and policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    /// HTTP method.
    pub method: RouteMethod,
    /// Route template in axum syntax, e.g. `/api/lab/tests/{id}/sample`.
    pub path: String,
    /// Capability check.
    pub guard: RouteGuard,
    /// Whether tenant scope is enforced after the guard.
    #[serde(default = "default_scoped")]
    pub scoped: bool,
    /// Path parameter carrying a requested organization id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_param: Option<String>,
    /// Action name for audit records. Defaults to `"<METHOD> <path>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl RouteRule {
    /// Creates a scoped rule.
    pub fn new(method: RouteMethod, path: impl Into<String>, guard: RouteGuard) -> Self {
        Self {
            method,
            path: path.into(),
            guard,
            scoped: true,
            org_param: None,
            action: None,
        }
    }

    /// Creates a scoped `GET` rule.
    pub fn get(path: impl Into<String>, guard: RouteGuard) -> Self {
        Self::new(RouteMethod::Get, path, guard)
    }

    /// Creates a scoped `POST` rule.
    pub fn post(path: impl Into<String>, guard: RouteGuard) -> Self {
        Self::new(RouteMethod::Post, path, guard)
    }

    /// Creates a scoped `PUT` rule.
    pub fn put(path: impl Into<String>, guard: RouteGuard) -> Self {
        Self::new(RouteMethod::Put, path, guard)
    }

    /// Creates a scoped `PATCH` rule.
    pub fn patch(path: impl Into<String>, guard: RouteGuard) -> Self {
        Self::new(RouteMethod::Patch, path, guard)
    }

    /// Creates a scoped `DELETE` rule.
    pub fn delete(path: impl Into<String>, guard: RouteGuard) -> Self {
        Self::new(RouteMethod::Delete, path, guard)
    }

    /// Disables tenant scope enforcement for this route.
    pub fn unscoped(mut self) -> Self {
        self.scoped = false;
        self
    }

    /// Reads the requested organization from path parameter `name`.
    pub fn with_org_param(mut self, name: impl Into<String>) -> Self {
        self.org_param = Some(name.into());
        self
    }

    /// Sets the audit action name.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Returns the audit action name.
    pub fn action_name(&self) -> String {
        self.action
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }

    /// Returns the names of the `{param}` segments in the path.
    pub fn path_params(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|s| s.trim_start_matches('*'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_mapping() {
        assert_eq!(RouteMethod::from_method(&Method::PATCH), Some(RouteMethod::Patch));
        assert_eq!(RouteMethod::from_method(&Method::OPTIONS), None);
        assert_eq!(RouteMethod::Delete.as_method(), Method::DELETE);
    }

    #[test]
    fn test_guard_serde() {
        let guard: RouteGuard =
            serde_json::from_value(json!({ "type": "permission", "group": "LAB_PROCESS" }))
                .unwrap();
        assert_eq!(guard, RouteGuard::permission("LAB_PROCESS"));

        let guard: RouteGuard =
            serde_json::from_value(json!({ "type": "roles", "roles": ["HRManager", "Doctor"] }))
                .unwrap();
        assert_eq!(guard, RouteGuard::roles([Role::HrManager, Role::Doctor]));

        let guard: RouteGuard = serde_json::from_value(json!({ "type": "super_admin" })).unwrap();
        assert_eq!(guard, RouteGuard::SuperAdmin);
    }

    #[test]
    fn test_guard_rejects_unknown_role() {
        let result: Result<RouteGuard, _> =
            serde_json::from_value(json!({ "type": "roles", "roles": ["Janitor"] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_defaults() {
        let rule: RouteRule = serde_json::from_value(json!({
            "method": "GET",
            "path": "/api/wards",
            "guard": { "type": "admin" }
        }))
        .unwrap();
        assert!(rule.scoped);
        assert_eq!(rule.org_param, None);
        assert_eq!(rule.action_name(), "GET /api/wards");
    }

    #[test]
    fn test_rule_builder() {
        let rule = RouteRule::patch("/api/organizations/{id}", RouteGuard::Admin)
            .with_org_param("id")
            .with_action("organizations.update");
        assert_eq!(rule.method, RouteMethod::Patch);
        assert_eq!(rule.org_param.as_deref(), Some("id"));
        assert_eq!(rule.action_name(), "organizations.update");
        assert!(!rule.clone().unscoped().scoped);
    }

    #[test]
    fn test_path_params() {
        let rule = RouteRule::get("/api/lab/tests/{id}/results/{result_id}", RouteGuard::Admin);
        let params: Vec<_> = rule.path_params().collect();
        assert_eq!(params, vec!["id", "result_id"]);
    }

    #[test]
    fn test_guard_group() {
        assert_eq!(RouteGuard::permission("ORG_VIEW").group(), Some("ORG_VIEW"));
        assert_eq!(RouteGuard::Admin.group(), None);
    }
}
