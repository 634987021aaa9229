//! Ordered security chain.
//!
//! Each request is matched against the stages in order and the first match
//! decides how it is handled:
//!
//! 1. `ignored`: static asset patterns, passed straight to routing.
//! 2. `login-processing`: POST to the login URL, passed to the login handler.
//! 3. `logout`: the logout URL, passed to the logout handler.
//! 4. `authorize`: everything else goes through the policy engine.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

use gatehouse_auth::policy::{AccessRequest, PathMatcher, matcher::is_normalized};
use gatehouse_core::config::{AuthConfig, PolicyConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use crate::error::ApiError;
use crate::extractors::session::session_id_from_headers;
use crate::state::AppState;

/// What a stage does with the requests it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// Skip authorization entirely.
    Bypass,
    /// Resolve the principal and ask the policy engine.
    Authorize,
}

#[derive(Debug, Clone)]
enum StageMatcher {
    Patterns(Vec<PathMatcher>),
    Endpoint { path: String, methods: Vec<Method> },
    Any,
}

impl StageMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        match self {
            Self::Patterns(matchers) => matchers.iter().any(|m| m.matches(path)),
            Self::Endpoint { path: p, methods } => p == path && methods.contains(method),
            Self::Any => true,
        }
    }
}

/// One entry of the chain.
#[derive(Debug, Clone)]
pub struct SecurityStage {
    name: &'static str,
    matcher: StageMatcher,
    action: StageAction,
}

impl SecurityStage {
    /// Stage name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stage action.
    pub fn action(&self) -> StageAction {
        self.action
    }
}

/// Request filter stages evaluated in order; first match wins.
#[derive(Debug, Clone)]
pub struct SecurityChain {
    stages: Vec<SecurityStage>,
    fallback: SecurityStage,
}

impl SecurityChain {
    /// Builds the standard four-stage chain.
    pub fn from_config(policy: &PolicyConfig, auth: &AuthConfig) -> AppResult<Self> {
        let stages = vec![
            SecurityStage {
                name: "ignored",
                matcher: StageMatcher::Patterns(PathMatcher::compile_all(&policy.ignored)?),
                action: StageAction::Bypass,
            },
            SecurityStage {
                name: "login-processing",
                matcher: StageMatcher::Endpoint {
                    path: auth.login_processing_url.clone(),
                    methods: vec![Method::POST],
                },
                action: StageAction::Bypass,
            },
            SecurityStage {
                name: "logout",
                matcher: StageMatcher::Endpoint {
                    path: auth.logout_url.clone(),
                    methods: vec![Method::GET, Method::POST],
                },
                action: StageAction::Bypass,
            },
        ];

        Ok(Self {
            stages,
            fallback: SecurityStage {
                name: "authorize",
                matcher: StageMatcher::Any,
                action: StageAction::Authorize,
            },
        })
    }

    /// First stage matching the request.
    pub fn select(&self, method: &Method, path: &str) -> &SecurityStage {
        self.stages
            .iter()
            .find(|stage| stage.matcher.matches(method, path))
            .unwrap_or(&self.fallback)
    }
}

/// Runs every request through the security chain.
///
/// Allowed requests continue with the resolved `Principal` attached as a
/// request extension. Denied anonymous callers are redirected to the login
/// page; denied authenticated callers to the access-denied page.
pub async fn security_filter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_normalized(&path) {
        warn!(path = %path, "Rejected non-normalized request path");
        return ApiError::from(AppError::validation("Request path is not normalized"))
            .into_response();
    }

    let stage = state.security_chain.select(request.method(), &path);
    if stage.action() == StageAction::Bypass {
        debug!(path = %path, stage = stage.name(), "Security chain bypass");
        return next.run(request).await;
    }

    let session_id = session_id_from_headers(request.headers(), &state.config.auth.session_cookie_name);
    let method = request.method().as_str().to_string();
    let authorization = state
        .policy
        .authorize(session_id, &AccessRequest::new(&path, &method));

    if !authorization.decision.allow {
        let auth = &state.config.auth;
        let target = if authorization.principal.is_anonymous() {
            &auth.login_page
        } else {
            &auth.access_denied_page
        };
        debug!(
            path = %path,
            username = %authorization.principal.username(),
            reason = %authorization.decision.reason,
            redirect = %target,
            "Request denied"
        );
        return Redirect::to(target).into_response();
    }

    if let Some(id) = session_id.filter(|_| !authorization.principal.is_anonymous()) {
        state.registry.touch(id);
    }

    request.extensions_mut().insert(authorization.principal);
    next.run(request).await
}
