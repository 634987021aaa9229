//! In-memory session registry with per-principal admission control.
//!
//! Sessions are stored per principal; a second index maps session ids back
//! to their principal. Admission holds the principal's map entry for the
//! whole check-and-insert, so two concurrent logins for the same account
//! serialize while logins for different accounts proceed in parallel.
//!
//! Lock order is always principal entry first, then session index.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use gatehouse_core::config::OverflowStrategy;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{PrincipalId, SessionId};

use crate::policy::PrincipalResolver;
use crate::principal::Principal;

use super::model::{Session, SessionPolicy};

/// Outcome of an admission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A new session was created.
    Admitted(Session),
    /// The principal is at its session limit and the policy rejects new logins.
    Denied {
        /// Reason for denial.
        reason: String,
    },
}

/// Tracks live sessions and enforces the concurrent session limit.
#[derive(Debug)]
pub struct SessionRegistry {
    /// Lifetime and limit rules.
    policy: SessionPolicy,
    /// Principal → its sessions, oldest first.
    by_principal: DashMap<PrincipalId, Vec<Session>>,
    /// Session → owning principal.
    by_session: DashMap<SessionId, PrincipalId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy,
            by_principal: DashMap::new(),
            by_session: DashMap::new(),
        }
    }

    /// Returns the policy in force.
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Attempts to open a session for `principal`.
    ///
    /// Expired sessions of the principal are pruned first and never count
    /// toward the limit.
    pub fn admit(&self, principal: &Principal) -> AppResult<Admission> {
        let principal_id = principal
            .id()
            .ok_or_else(|| AppError::validation("Anonymous principal cannot hold a session"))?;
        let now = Utc::now();

        let mut stale: Vec<SessionId> = Vec::new();
        let admission = {
            let mut entry = self.by_principal.entry(principal_id).or_default();
            let sessions = entry.value_mut();

            sessions.retain(|s| {
                let live = self.policy.is_live(s, now);
                if !live {
                    stale.push(s.id);
                }
                live
            });

            match self.make_room(sessions, &mut stale) {
                Some(reason) => Admission::Denied { reason },
                None => {
                    let session = Session::open(principal_id, principal, now);
                    sessions.push(session.clone());
                    self.by_session.insert(session.id, principal_id);
                    Admission::Admitted(session)
                }
            }
        };

        for id in &stale {
            self.by_session.remove(id);
        }

        match &admission {
            Admission::Admitted(session) => info!(
                principal_id = %principal_id,
                session_id = %session.id,
                evicted = stale.len(),
                "Session admitted"
            ),
            Admission::Denied { reason } => warn!(
                principal_id = %principal_id,
                reason = %reason,
                "Session admission denied"
            ),
        }

        Ok(admission)
    }

    /// Applies the overflow strategy to a principal's live sessions.
    ///
    /// Returns a denial reason, or `None` when there is room. Evicted
    /// session ids are appended to `evicted`.
    fn make_room(&self, sessions: &mut Vec<Session>, evicted: &mut Vec<SessionId>) -> Option<String> {
        let max = self.policy.max_sessions? as usize;

        if sessions.len() < max {
            return None;
        }

        match self.policy.overflow {
            OverflowStrategy::Deny => Some(format!(
                "Maximum of {max} concurrent session(s) reached"
            )),
            OverflowStrategy::KickOldest => {
                while sessions.len() >= max && !sessions.is_empty() {
                    let oldest = sessions.remove(0);
                    debug!(session_id = %oldest.id, "Evicting oldest session");
                    evicted.push(oldest.id);
                }
                None
            }
        }
    }

    /// Returns the live session with `session_id`.
    pub fn get(&self, session_id: SessionId) -> Option<Session> {
        let principal_id = *self.by_session.get(&session_id)?;
        let sessions = self.by_principal.get(&principal_id)?;
        let now = Utc::now();

        sessions
            .iter()
            .find(|s| s.id == session_id && self.policy.is_live(s, now))
            .cloned()
    }

    /// Whether `session_id` names a live session.
    pub fn is_valid(&self, session_id: SessionId) -> bool {
        self.get(session_id).is_some()
    }

    /// Records activity on a live session. Unknown or expired sessions are ignored.
    pub fn touch(&self, session_id: SessionId) {
        let Some(principal_id) = self.by_session.get(&session_id).map(|p| *p) else {
            return;
        };
        let Some(mut sessions) = self.by_principal.get_mut(&principal_id) else {
            return;
        };

        let now = Utc::now();
        if let Some(session) = sessions
            .iter_mut()
            .find(|s| s.id == session_id && self.policy.is_live(s, now))
        {
            session.last_seen_at = now;
        }
    }

    /// Removes a session. Idempotent: returns whether anything was removed.
    pub fn invalidate(&self, session_id: SessionId) -> bool {
        let Some((_, principal_id)) = self.by_session.remove(&session_id) else {
            debug!(session_id = %session_id, "Invalidate on unknown session");
            return false;
        };

        let removed = match self.by_principal.get_mut(&principal_id) {
            Some(mut sessions) => {
                let before = sessions.len();
                sessions.retain(|s| s.id != session_id);
                sessions.len() < before
            }
            None => false,
        };
        self.by_principal
            .remove_if(&principal_id, |_, sessions| sessions.is_empty());

        if removed {
            info!(session_id = %session_id, principal_id = %principal_id, "Session invalidated");
        }
        removed
    }

    /// Returns the live sessions of a principal, oldest first.
    pub fn sessions_for(&self, principal_id: PrincipalId) -> Vec<Session> {
        let now = Utc::now();
        self.by_principal
            .get(&principal_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter(|s| self.policy.is_live(s, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live sessions across all principals.
    pub fn active_count(&self) -> usize {
        let now = Utc::now();
        self.by_principal
            .iter()
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|s| self.policy.is_live(s, now))
                    .count()
            })
            .sum()
    }

    /// Drops every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut expired: Vec<SessionId> = Vec::new();

        for mut entry in self.by_principal.iter_mut() {
            entry.value_mut().retain(|s| {
                let live = self.policy.is_live(s, now);
                if !live {
                    expired.push(s.id);
                }
                live
            });
        }
        self.by_principal.retain(|_, sessions| !sessions.is_empty());

        for id in &expired {
            self.by_session.remove(id);
        }

        expired.len()
    }
}

impl PrincipalResolver for SessionRegistry {
    fn resolve(&self, session_id: Option<SessionId>) -> Principal {
        session_id
            .and_then(|id| self.get(id))
            .map(|session| session.principal())
            .unwrap_or_else(Principal::anonymous)
    }
}
