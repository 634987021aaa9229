//! Affirmative-based policy engine.

use std::sync::Arc;

use tracing::debug;

use gatehouse_core::config::{AuthConfig, PolicyConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::types::SessionId;

use crate::principal::Principal;

use super::matcher::PathMatcher;
use super::voter::{AccessVoter, RuleVoter, Vote};

/// The resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest<'a> {
    /// Request path, without query string.
    pub path: &'a str,
    /// HTTP method.
    pub method: &'a str,
}

impl<'a> AccessRequest<'a> {
    /// Creates a request descriptor.
    pub fn new(path: &'a str, method: &'a str) -> Self {
        Self { path, method }
    }
}

/// Allow/deny verdict for one request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Whether the request may proceed.
    pub allow: bool,
    /// Why.
    pub reason: String,
}

impl PolicyDecision {
    /// An allow verdict.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allow: true,
            reason: reason.into(),
        }
    }

    /// A deny verdict.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            reason: reason.into(),
        }
    }

    /// Converts a denial into a `PolicyDenied` error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.allow {
            Ok(())
        } else {
            Err(AppError::policy_denied(self.reason))
        }
    }
}

/// Maps a request's session token to the principal behind it.
///
/// Unknown, expired or missing sessions resolve to the anonymous principal.
pub trait PrincipalResolver: Send + Sync {
    /// Resolves the principal for `session_id`.
    fn resolve(&self, session_id: Option<SessionId>) -> Principal;
}

/// Principal and verdict produced for one request.
#[derive(Debug, Clone)]
pub struct Authorization {
    /// Who made the request.
    pub principal: Principal,
    /// What the engine decided.
    pub decision: PolicyDecision,
}

/// Evaluates the access policy for each request.
///
/// 1. Paths on the permit-all allowlist are allowed outright.
/// 2. Anonymous principals are denied.
/// 3. Voters run in registration order; the first grant allows the request.
///    Denials and abstentions never override a grant.
pub struct PolicyEngine {
    permit_all: Vec<PathMatcher>,
    voters: Vec<Arc<dyn AccessVoter>>,
    allow_if_all_abstain: bool,
    resolver: Arc<dyn PrincipalResolver>,
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field(
                "permit_all",
                &self.permit_all.iter().map(PathMatcher::as_str).collect::<Vec<_>>(),
            )
            .field("voters", &self.voters)
            .field("allow_if_all_abstain", &self.allow_if_all_abstain)
            .finish_non_exhaustive()
    }
}

impl PolicyEngine {
    /// Creates an engine with no allowlist and no voters.
    pub fn new(resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self {
            permit_all: Vec::new(),
            voters: Vec::new(),
            allow_if_all_abstain: false,
            resolver,
        }
    }

    /// Builds the engine from configuration.
    ///
    /// The ignored static asset patterns, login page, login endpoint and
    /// access-denied page are always on the allowlist; the rule table
    /// becomes the first voter.
    pub fn from_config(
        policy: &PolicyConfig,
        auth: &AuthConfig,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Result<Self, AppError> {
        let mut permit_all = policy.permit_all.clone();
        for required in policy.ignored.iter().chain([
            &auth.login_page,
            &auth.login_processing_url,
            &auth.access_denied_page,
        ]) {
            if !permit_all.contains(required) {
                permit_all.push(required.clone());
            }
        }

        Ok(Self::new(resolver)
            .with_permit_all(&permit_all)?
            .with_voter(Arc::new(RuleVoter::from_config(&policy.rules)?))
            .allow_if_all_abstain(policy.allow_if_all_abstain))
    }

    /// Adds patterns to the permit-all allowlist.
    pub fn with_permit_all<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, AppError> {
        self.permit_all.extend(PathMatcher::compile_all(patterns)?);
        Ok(self)
    }

    /// Appends a voter.
    pub fn with_voter(mut self, voter: Arc<dyn AccessVoter>) -> Self {
        self.voters.push(voter);
        self
    }

    /// Grants when every voter abstains.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }

    /// Whether `path` is on the permit-all allowlist.
    pub fn is_permitted(&self, path: &str) -> bool {
        self.permit_all.iter().any(|m| m.matches(path))
    }

    /// Decides whether `principal` may perform `request`.
    pub fn decide(&self, principal: &Principal, request: &AccessRequest<'_>) -> PolicyDecision {
        if self.is_permitted(request.path) {
            return PolicyDecision::allow("permit_all");
        }

        if principal.is_anonymous() {
            return PolicyDecision::deny("unauthenticated");
        }

        let mut denied_by: Option<&str> = None;
        for voter in &self.voters {
            match voter.vote(principal, request) {
                Vote::Grant => {
                    return PolicyDecision::allow(format!("granted by {}", voter.name()));
                }
                Vote::Deny => {
                    denied_by.get_or_insert(voter.name());
                }
                Vote::Abstain => {}
            }
        }

        match denied_by {
            Some(name) => PolicyDecision::deny(format!("access denied by {name}")),
            None if self.allow_if_all_abstain => PolicyDecision::allow("all voters abstained"),
            None => PolicyDecision::deny("all voters abstained"),
        }
    }

    /// Resolves the request's principal and decides.
    ///
    /// Allowlisted paths are decided before the session is looked at, so they
    /// never touch the resolver and always carry the anonymous principal.
    pub fn authorize(
        &self,
        session_id: Option<SessionId>,
        request: &AccessRequest<'_>,
    ) -> Authorization {
        if self.is_permitted(request.path) {
            return Authorization {
                principal: Principal::anonymous(),
                decision: PolicyDecision::allow("permit_all"),
            };
        }

        let principal = self.resolver.resolve(session_id);
        let decision = self.decide(&principal, request);

        debug!(
            path = %request.path,
            method = %request.method,
            username = %principal.username(),
            allow = decision.allow,
            reason = %decision.reason,
            "Policy decision"
        );

        Authorization {
            principal,
            decision,
        }
    }
}
