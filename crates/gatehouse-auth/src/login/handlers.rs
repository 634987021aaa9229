//! Login, failure and logout callbacks.

use async_trait::async_trait;
use tracing::info;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::SessionId;

use crate::principal::Principal;
use crate::session::Session;

use super::flow::RejectReason;

/// A rejected login attempt as seen by the failure callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Submitted username, trimmed.
    pub username: String,
    /// Why the attempt was rejected.
    pub reason: RejectReason,
}

/// Invoked after a session has been admitted. Returns the redirect target.
///
/// An error rolls the admission back.
#[async_trait]
pub trait AuthenticationSuccessHandler: Send + Sync + std::fmt::Debug {
    /// Handles a successful login.
    async fn on_success(&self, principal: &Principal, session: &Session) -> AppResult<String>;
}

/// Invoked on every rejected login. Returns the redirect target.
#[async_trait]
pub trait AuthenticationFailureHandler: Send + Sync + std::fmt::Debug {
    /// Handles a rejected login.
    async fn on_failure(&self, failure: &AuthFailure) -> AppResult<String>;
}

/// Invoked on every logout, including logouts of unknown sessions.
#[async_trait]
pub trait LogoutHandler: Send + Sync + std::fmt::Debug {
    /// Handles a logout. `principal` is `None` when the session was not live.
    async fn on_logout(
        &self,
        principal: Option<&Principal>,
        session_id: Option<SessionId>,
    ) -> AppResult<()>;
}

/// Always redirects to a fixed target and records an audit line.
#[derive(Debug, Clone)]
pub struct RedirectSuccessHandler {
    target: String,
}

impl RedirectSuccessHandler {
    /// Creates a handler redirecting to `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl AuthenticationSuccessHandler for RedirectSuccessHandler {
    async fn on_success(&self, principal: &Principal, session: &Session) -> AppResult<String> {
        info!(
            username = %principal.username(),
            session_id = %session.id,
            roles = ?principal.roles(),
            "Login succeeded"
        );
        Ok(self.target.clone())
    }
}

/// Redirects every rejection to the same target, whatever the reason.
#[derive(Debug, Clone)]
pub struct RedirectFailureHandler {
    target: String,
}

impl RedirectFailureHandler {
    /// Creates a handler redirecting to `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl AuthenticationFailureHandler for RedirectFailureHandler {
    async fn on_failure(&self, _failure: &AuthFailure) -> AppResult<String> {
        Ok(self.target.clone())
    }
}

/// Records logouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogoutHandler;

#[async_trait]
impl LogoutHandler for AuditLogoutHandler {
    async fn on_logout(
        &self,
        principal: Option<&Principal>,
        session_id: Option<SessionId>,
    ) -> AppResult<()> {
        match (principal, session_id) {
            (Some(principal), Some(session_id)) => info!(
                username = %principal.username(),
                session_id = %session_id,
                "User logged out"
            ),
            (_, session_id) => info!(
                session_id = ?session_id.map(|id| id.to_string()),
                "Logout without a live session"
            ),
        }
        Ok(())
    }
}
