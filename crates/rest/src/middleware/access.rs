//! Access control middleware.
//!
//! Installed as a route layer so that it only sees requests that matched a
//! route. For each request it:
//!
//! 1. Looks up the [`RoutePolicy`](crate::policy::RoutePolicy) of the matched
//!    route template; a guarded route without one is a server fault.
//! 2. Runs the authorization rules of the route. Authentication and role
//!    failures are answered before the body is read or any organization id
//!    is looked at.
//! 3. Resolves the requested organization from the query, the JSON body and
//!    the path, optionally rejecting disagreeing sources.
//! 4. Runs the tenant scope rules.
//! 5. Records an audit event for the decision.
//! 6. On success, binds the `orgId` query parameter to the effective
//!    organization and attaches an [`AccessScope`] for handlers.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Uri, header, request::Parts, uri::PathAndQuery};
use hms_access::{
    AccessError, AccessRequest, Grant, OrgId, Phase, Principal,
    audit::{AccessLogEntry, AccessOutcome, log_access},
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::RestError;
use crate::extractors::AccessScope;
use crate::org::{ORG_ID_FIELD, OrgInput, OrgValidator, ResolvedOrg};
use crate::policy::RoutePolicy;
use crate::state::AppState;

/// Middleware function for access decisions.
///
/// Use with `Router::route_layer` and `axum::middleware::from_fn_with_state`,
/// behind [`authenticate_middleware`](super::authenticate_middleware).
pub async fn access_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RestError> {
    let (mut parts, body) = request.into_parts();
    let request_path = parts.uri.path().to_string();

    let Some(template) = parts
        .extensions
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
    else {
        error!(method = %parts.method, path = %request_path, "Access layer reached without a matched route");
        return Err(RestError::RouteNotConfigured {
            method: parts.method.to_string(),
            path: request_path,
        });
    };

    let Some(policy) = state.routes().lookup(&parts.method, &template) else {
        error!(method = %parts.method, route = %template, "Guarded route has no access policy");
        return Err(RestError::RouteNotConfigured {
            method: parts.method.to_string(),
            path: template,
        });
    };

    // Undecodable path params are reported only once the caller is authorized.
    let params = path_params(&mut parts, &state).await;

    let mut access_request = AccessRequest::new(parts.extensions.get::<Principal>().cloned())
        .with_path(request_path.as_str());
    access_request.params = params.as_ref().cloned().unwrap_or_default();

    let mut grant = Grant::default();
    if let Err(err) = policy.chain().evaluate_phase(
        Phase::Authorize,
        state.catalog(),
        &access_request,
        &mut grant,
    ) {
        // The body stays unread; only the query and path can name an org here.
        let resolved = state.resolver().resolve(&OrgInput {
            query: parts.uri.query(),
            body: None,
            params: &access_request.params,
            path_param: policy.org_param(),
        });
        access_request.requested_org = resolved.into_org_id();
        return Err(reject(&state, &policy, &access_request, err));
    }

    params?;
    let (body, json_body) = buffer_json_body(&parts.headers, body, state.config().max_body_size).await?;

    let resolved = state.resolver().resolve(&OrgInput {
        query: parts.uri.query(),
        body: json_body.as_ref(),
        params: &access_request.params,
        path_param: policy.org_param(),
    });

    if state.strict_org_validation() {
        if let Err(mismatch) = OrgValidator::validate_consistency(&resolved) {
            warn!(route = %template, error = %mismatch, "Rejected request with conflicting organization ids");
            return Err(RestError::OrganizationMismatch(mismatch));
        }
    }

    bind_requested_orgs(&mut access_request, resolved);

    if let Err(err) =
        policy
            .chain()
            .evaluate_phase(Phase::Scope, state.catalog(), &access_request, &mut grant)
    {
        return Err(reject(&state, &policy, &access_request, err));
    }

    if state.audit_enabled() {
        let org = grant
            .effective_org()
            .or(access_request.requested_org.as_ref());
        log_access(&AccessLogEntry::now(
            policy.action(),
            &request_path,
            access_request.principal(),
            org,
            AccessOutcome::Allowed,
        ));
    }

    let Some(principal) = access_request.principal else {
        return Err(RestError::InternalError {
            message: format!("route {} allowed an unauthenticated request", template),
        });
    };

    if let Some(org) = grant.effective_org() {
        bind_org_query(&mut parts.uri, org)?;
    }

    debug!(
        action = policy.action(),
        user_id = %principal.id,
        effective_org = grant.effective_org().map_or("*", OrgId::as_str),
        "Access granted"
    );

    parts.extensions.insert(AccessScope::new(
        principal,
        grant.scope().cloned(),
        policy.action(),
    ));

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Moves the resolved ids into the request: the primary source becomes the
/// requested organization, the rest must agree with the principal.
fn bind_requested_orgs(request: &mut AccessRequest, resolved: ResolvedOrg) {
    request.other_orgs = resolved.other_orgs().cloned().collect();
    request.requested_org = resolved.into_org_id();
}

/// Audits and logs a failed decision, then converts it for the client.
fn reject(
    state: &AppState,
    policy: &RoutePolicy,
    request: &AccessRequest,
    err: AccessError,
) -> RestError {
    if state.audit_enabled() {
        let outcome = if err.is_server_fault() {
            AccessOutcome::Fault(err.kind())
        } else {
            AccessOutcome::Denied(err.kind())
        };
        let org = match &err {
            AccessError::CrossTenantAccess {
                requested_org_id, ..
            } => Some(requested_org_id),
            _ => request.requested_org.as_ref(),
        };
        log_access(&AccessLogEntry::now(
            policy.action(),
            &request.path,
            request.principal(),
            org,
            outcome,
        ));
    }

    if !err.is_server_fault() {
        warn!(
            action = policy.action(),
            user_id = request.principal().map_or("anonymous", |p| p.id.as_str()),
            reason = err.kind(),
            "Access denied"
        );
    }
    err.into()
}

async fn path_params(
    parts: &mut Parts,
    state: &AppState,
) -> Result<HashMap<String, String>, RestError> {
    let raw = RawPathParams::from_request_parts(parts, state)
        .await
        .map_err(|rejection| RestError::BadRequest {
            message: rejection.body_text(),
        })?;
    Ok(raw
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

/// Returns `true` for `application/json` and `+json` media types.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media| {
            let media = media.trim().to_ascii_lowercase();
            media == "application/json" || media.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Buffers a JSON body so that its `orgId` can be read, then hands back an
/// equivalent body for the handler.
///
/// A body that does not parse as JSON is passed through; rejecting it is the
/// handler's concern.
async fn buffer_json_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<(Body, Option<Value>), RestError> {
    if !is_json(headers) {
        return Ok((body, None));
    }

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(RestError::PayloadTooLarge { limit });
    }

    // A fully buffered body only fails to collect past the limit.
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        debug!(error = %err, limit, "Failed to buffer request body");
        RestError::PayloadTooLarge { limit }
    })?;
    let json = serde_json::from_slice::<Value>(&bytes).ok();
    Ok((Body::from(bytes), json))
}

/// Replaces every `orgId` query parameter with the effective organization.
fn bind_org_query(uri: &mut Uri, org: &OrgId) -> Result<(), RestError> {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(existing) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(existing.as_bytes()) {
            if key != ORG_ID_FIELD {
                query.append_pair(&key, &value);
            }
        }
    }
    query.append_pair(ORG_ID_FIELD, org.as_str());

    let path_and_query: PathAndQuery = format!("{}?{}", uri.path(), query.finish())
        .parse()
        .map_err(|err| RestError::InternalError {
            message: format!("failed to rewrite query: {}", err),
        })?;

    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(path_and_query);
    *uri = Uri::from_parts(uri_parts).map_err(|err| RestError::InternalError {
        message: format!("failed to rebuild uri: {}", err),
    })?;
    Ok(())
}
