//! Route tables compiled into access chains.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use hms_access::AccessChain;
use hms_access::chain::TenantScope;

use super::error::PolicyError;
use crate::org::ORG_ID_FIELD;
use super::rule::{RouteMethod, RouteRule};
use super::table::RouteTable;

/// The compiled access policy of one route.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    chain: AccessChain,
    action: String,
    org_param: Option<String>,
}

impl RoutePolicy {
    /// Compiles one rule.
    ///
    /// A route without an explicit organization parameter still reads one
    /// from an `{orgId}` segment.
    pub fn from_rule(rule: &RouteRule) -> Self {
        let mut rules = vec![rule.guard.to_rule()];
        if rule.scoped {
            rules.push(Arc::new(TenantScope));
        }

        Self {
            chain: AccessChain::new(rules),
            action: rule.action_name(),
            org_param: rule.org_param.clone().or_else(|| {
                rule.path_params()
                    .any(|name| name == ORG_ID_FIELD)
                    .then(|| ORG_ID_FIELD.to_string())
            }),
        }
    }

    /// Returns the access chain.
    pub fn chain(&self) -> &AccessChain {
        &self.chain
    }

    /// Returns the audit action name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the path parameter carrying a requested organization id.
    pub fn org_param(&self) -> Option<&str> {
        self.org_param.as_deref()
    }
}

/// Route policies keyed by method and axum route template.
#[derive(Debug, Clone, Default)]
pub struct CompiledRoutes {
    policies: HashMap<(RouteMethod, String), Arc<RoutePolicy>>,
}

impl CompiledRoutes {
    /// Compiles every rule of `table`.
    ///
    /// Fails on the first duplicate (method, path) pair. Unknown permission
    /// groups are not checked here; see [`RouteTable::validate`].
    pub fn compile(table: &RouteTable) -> Result<Self, PolicyError> {
        let mut policies = HashMap::with_capacity(table.len());
        for rule in table.routes() {
            let key = (rule.method, rule.path.clone());
            if policies.contains_key(&key) {
                return Err(PolicyError::DuplicateRoute {
                    method: rule.method,
                    path: rule.path.clone(),
                });
            }
            policies.insert(key, Arc::new(RoutePolicy::from_rule(rule)));
        }
        Ok(Self { policies })
    }

    /// Finds the policy for a request method and matched route template.
    pub fn lookup(&self, method: &Method, template: &str) -> Option<Arc<RoutePolicy>> {
        let method = RouteMethod::from_method(method)?;
        self.policies
            .get(&(method, template.to_string()))
            .map(Arc::clone)
    }

    /// Returns the number of compiled routes.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if no routes are compiled.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
