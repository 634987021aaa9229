//! Login and logout orchestration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::ErrorKind;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::SessionId;

use crate::credential::CredentialStore;
use crate::password::PasswordHasher;
use crate::session::{Admission, Session, SessionRegistry};

use super::handlers::{
    AuditLogoutHandler, AuthFailure, AuthenticationFailureHandler, AuthenticationSuccessHandler,
    LogoutHandler, RedirectFailureHandler, RedirectSuccessHandler,
};

/// Verified against when the username is unknown so both paths cost the same.
const TIMING_DUMMY_PASSWORD: &str = "gatehouse-timing-dummy";

/// Stage of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    /// No credentials submitted yet.
    AwaitingCredentials,
    /// Credentials are being checked.
    Verifying,
    /// A session was opened.
    Admitted,
    /// The attempt failed.
    Rejected,
}

/// Why a login was rejected.
///
/// Unknown usernames and wrong passwords share one reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Unknown username or wrong password.
    BadCredentials,
    /// The account is at its session limit.
    SessionLimit,
}

impl RejectReason {
    /// Matching error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadCredentials => ErrorKind::BadCredentials,
            Self::SessionLimit => ErrorKind::SessionLimitExceeded,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadCredentials => write!(f, "bad credentials"),
            Self::SessionLimit => write!(f, "session limit"),
        }
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// A session was opened.
    Admitted {
        /// The new session; its id is the client token.
        session: Session,
        /// Where to send the client.
        redirect: String,
    },
    /// The attempt failed.
    Rejected {
        /// Why.
        reason: RejectReason,
        /// Where to send the client.
        redirect: String,
    },
}

impl LoginOutcome {
    /// Terminal state of the attempt.
    pub fn state(&self) -> LoginState {
        match self {
            Self::Admitted { .. } => LoginState::Admitted,
            Self::Rejected { .. } => LoginState::Rejected,
        }
    }

    /// Redirect target chosen by the callback.
    pub fn redirect(&self) -> &str {
        match self {
            Self::Admitted { redirect, .. } | Self::Rejected { redirect, .. } => redirect,
        }
    }

    /// The admitted session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Admitted { session, .. } => Some(session),
            Self::Rejected { .. } => None,
        }
    }
}

/// Result of a logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Whether a live session was removed.
    pub invalidated: bool,
    /// Where to send the client.
    pub redirect: String,
}

/// Invalidates an admitted session unless committed.
///
/// Covers both a failing success callback and the login future being
/// dropped while the callback runs.
struct AdmissionGuard<'a> {
    registry: &'a SessionRegistry,
    session_id: SessionId,
    armed: bool,
}

impl<'a> AdmissionGuard<'a> {
    fn new(registry: &'a SessionRegistry, session_id: SessionId) -> Self {
        Self {
            registry,
            session_id,
            armed: true,
        }
    }

    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(session_id = %self.session_id, "Login did not complete, rolling back session");
            self.registry.invalidate(self.session_id);
        }
    }
}

/// Drives a login attempt from submitted credentials to an admitted or
/// rejected outcome, and runs the logout sequence.
pub struct LoginFlow {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    registry: Arc<SessionRegistry>,
    success_handler: Arc<dyn AuthenticationSuccessHandler>,
    failure_handler: Arc<dyn AuthenticationFailureHandler>,
    logout_handlers: Vec<Arc<dyn LogoutHandler>>,
    logout_success_url: String,
    /// Hash verified when the username is unknown.
    dummy_hash: String,
}

impl fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFlow")
            .field("store", &self.store)
            .field("success_handler", &self.success_handler)
            .field("failure_handler", &self.failure_handler)
            .field("logout_handlers", &self.logout_handlers)
            .field("logout_success_url", &self.logout_success_url)
            .finish_non_exhaustive()
    }
}

impl LoginFlow {
    /// Creates a flow with the default redirect callbacks taken from `auth`.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        registry: Arc<SessionRegistry>,
        auth: &AuthConfig,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash_password(TIMING_DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            hasher,
            registry,
            success_handler: Arc::new(RedirectSuccessHandler::new(&auth.default_success_url)),
            failure_handler: Arc::new(RedirectFailureHandler::new(&auth.failure_url)),
            logout_handlers: vec![Arc::new(AuditLogoutHandler) as Arc<dyn LogoutHandler>],
            logout_success_url: auth.logout_success_url.clone(),
            dummy_hash,
        })
    }

    /// Replaces the success callback.
    pub fn with_success_handler(mut self, handler: Arc<dyn AuthenticationSuccessHandler>) -> Self {
        self.success_handler = handler;
        self
    }

    /// Replaces the failure callback.
    pub fn with_failure_handler(mut self, handler: Arc<dyn AuthenticationFailureHandler>) -> Self {
        self.failure_handler = handler;
        self
    }

    /// Adds a logout callback; callbacks run in registration order.
    pub fn with_logout_handler(mut self, handler: Arc<dyn LogoutHandler>) -> Self {
        self.logout_handlers.push(handler);
        self
    }

    /// Authenticates `username`/`password` and opens a session.
    ///
    /// Rejections are `Ok(LoginOutcome::Rejected)`. `Err` means a
    /// collaborator failed: the credential store was unreachable, or a
    /// callback errored.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        self.authenticate_replacing(None, username, password).await
    }

    /// Like [`authenticate`](Self::authenticate), for a client that already
    /// holds `previous`.
    ///
    /// A successful login ends `previous`, since the client can no longer
    /// present it. When it belongs to the same account it is ended before
    /// admission so it does not count against the session limit. Bad
    /// credentials leave it untouched.
    pub async fn authenticate_replacing(
        &self,
        previous: Option<SessionId>,
        username: &str,
        password: &str,
    ) -> AppResult<LoginOutcome> {
        let username = username.trim();
        debug!(username = %username, state = ?LoginState::Verifying, "Verifying credentials");

        if username.is_empty() || password.is_empty() {
            self.hasher.verify_password(password, &self.dummy_hash);
            return self.reject(username, RejectReason::BadCredentials).await;
        }

        let principal = match self.store.lookup(username).await? {
            Some(record) if self.hasher.verify_password(password, &record.password_hash) => {
                record.to_principal()
            }
            Some(_) => return self.reject(username, RejectReason::BadCredentials).await,
            None => {
                self.hasher.verify_password(password, &self.dummy_hash);
                return self.reject(username, RejectReason::BadCredentials).await;
            }
        };

        let previous = previous.and_then(|id| self.registry.get(id));
        if let Some(prev) = &previous {
            if principal.id() == Some(prev.principal_id) {
                debug!(session_id = %prev.id, "Re-login replaces the presented session");
                self.registry.invalidate(prev.id);
            }
        }

        let session = match self.registry.admit(&principal)? {
            Admission::Admitted(session) => session,
            Admission::Denied { .. } => {
                return self.reject(username, RejectReason::SessionLimit).await;
            }
        };

        let guard = AdmissionGuard::new(&self.registry, session.id);
        let redirect = self.success_handler.on_success(&principal, &session).await?;
        guard.commit();

        if let Some(prev) = previous {
            if self.registry.invalidate(prev.id) {
                info!(
                    session_id = %prev.id,
                    username = %prev.username,
                    "Ended session replaced by a login on the same client"
                );
            }
        }

        Ok(LoginOutcome::Admitted { session, redirect })
    }

    async fn reject(&self, username: &str, reason: RejectReason) -> AppResult<LoginOutcome> {
        warn!(username = %username, reason = %reason, "Login rejected");

        let failure = AuthFailure {
            username: username.to_string(),
            reason,
        };
        let redirect = self.failure_handler.on_failure(&failure).await?;

        Ok(LoginOutcome::Rejected { reason, redirect })
    }

    /// Ends the session named by `session_id`, if any.
    ///
    /// Every logout callback runs even when there was nothing to
    /// invalidate. A failing callback is logged and does not stop the others.
    pub async fn logout(&self, session_id: Option<SessionId>) -> LogoutOutcome {
        let principal = session_id
            .and_then(|id| self.registry.get(id))
            .map(|session| session.principal());
        let invalidated = session_id.is_some_and(|id| self.registry.invalidate(id));

        for handler in &self.logout_handlers {
            if let Err(e) = handler.on_logout(principal.as_ref(), session_id).await {
                warn!(handler = ?handler, error = %e, "Logout handler failed");
            }
        }

        info!(
            session_id = ?session_id.map(|id| id.to_string()),
            invalidated = invalidated,
            "Logout completed"
        );

        LogoutOutcome {
            invalidated,
            redirect: self.logout_success_url.clone(),
        }
    }
}
