//! Session record and lifetime policy.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::config::{OverflowStrategy, SessionConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{PrincipalId, SessionId};

use crate::principal::Principal;

/// A login session.
///
/// Carries a snapshot of the principal's roles taken at admission, so the
/// session keeps authenticating as the same principal even if the
/// underlying credential changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier, also the opaque client token.
    pub id: SessionId,
    /// Owning account.
    pub principal_id: PrincipalId,
    /// Login name at admission.
    pub username: String,
    /// Roles at admission.
    pub roles: BTreeSet<String>,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// Last request seen on this session.
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn open(principal_id: PrincipalId, principal: &Principal, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            principal_id,
            username: principal.username().to_string(),
            roles: principal.roles().clone(),
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Rebuilds the principal this session authenticates.
    pub fn principal(&self) -> Principal {
        Principal::authenticated(self.principal_id, self.username.clone(), self.roles.iter().cloned())
    }
}

/// Lifetime and concurrency rules applied by the registry.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Maximum live sessions per principal; `None` is unlimited.
    pub max_sessions: Option<u32>,
    /// Behavior when a principal is at the limit.
    pub overflow: OverflowStrategy,
    /// A session idle this long stops being live.
    pub idle_timeout: Duration,
    /// A session this old stops being live regardless of activity.
    pub absolute_timeout: Duration,
}

impl SessionPolicy {
    /// The single-session policy: one live session, new logins rejected.
    pub fn single_session() -> Self {
        Self {
            max_sessions: Some(1),
            overflow: OverflowStrategy::Deny,
            idle_timeout: Duration::minutes(30),
            absolute_timeout: Duration::hours(12),
        }
    }

    /// Whether `session` is live at `now`.
    pub fn is_live(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_seen_at < self.idle_timeout
            && now - session.created_at < self.absolute_timeout
    }
}

/// Converts a whole-unit config value into a positive duration.
pub(crate) fn positive_duration(
    field: &str,
    value: u64,
    unit: fn(i64) -> Option<Duration>,
) -> AppResult<Duration> {
    if value == 0 {
        return Err(AppError::configuration(format!("session.{field} must be positive")));
    }
    i64::try_from(value)
        .ok()
        .and_then(unit)
        .ok_or_else(|| AppError::configuration(format!("session.{field} is out of range: {value}")))
}

impl TryFrom<&SessionConfig> for SessionPolicy {
    type Error = AppError;

    fn try_from(config: &SessionConfig) -> AppResult<Self> {
        // 0 means unlimited.
        let max_sessions = (config.limits.enabled && config.limits.max_sessions > 0)
            .then_some(config.limits.max_sessions);

        Ok(Self {
            max_sessions,
            overflow: config.limits.overflow_strategy,
            idle_timeout: positive_duration(
                "idle_timeout_minutes",
                config.idle_timeout_minutes,
                Duration::try_minutes,
            )?,
            absolute_timeout: positive_duration(
                "absolute_timeout_hours",
                config.absolute_timeout_hours,
                Duration::try_hours,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;

    use super::*;

    fn session_at(created: DateTime<Utc>, seen: DateTime<Utc>) -> Session {
        let principal = Principal::authenticated(PrincipalId::new(), "u", Vec::new());
        let mut s = Session::open(principal.id().expect("id"), &principal, created);
        s.last_seen_at = seen;
        s
    }

    #[test]
    fn test_idle_expiry() {
        let policy = SessionPolicy::single_session();
        let now = Utc::now();
        let s = session_at(now - Duration::minutes(40), now - Duration::minutes(31));
        assert!(!policy.is_live(&s, now));
        let s = session_at(now - Duration::minutes(40), now - Duration::minutes(5));
        assert!(policy.is_live(&s, now));
    }

    #[test]
    fn test_absolute_expiry() {
        let policy = SessionPolicy::single_session();
        let now = Utc::now();
        let s = session_at(now - Duration::hours(13), now);
        assert!(!policy.is_live(&s, now));
    }

    fn policy(config: &SessionConfig) -> SessionPolicy {
        SessionPolicy::try_from(config).expect("policy")
    }

    #[test]
    fn test_from_config() {
        let mut config = SessionConfig::default();
        assert_eq!(policy(&config).max_sessions, Some(1));
        assert_eq!(policy(&config).idle_timeout, Duration::minutes(30));

        config.limits.enabled = false;
        assert_eq!(policy(&config).max_sessions, None);

        config.limits.enabled = true;
        config.limits.max_sessions = 0;
        assert_eq!(policy(&config).max_sessions, None);
    }

    #[test]
    fn test_out_of_range_timeouts_rejected() {
        for (idle, absolute) in [(u64::MAX, 12), (1 << 60, 12), (0, 12), (30, 0), (30, u64::MAX)] {
            let config = SessionConfig {
                idle_timeout_minutes: idle,
                absolute_timeout_hours: absolute,
                ..SessionConfig::default()
            };
            let err = SessionPolicy::try_from(&config).expect_err("invalid timeouts");
            assert_eq!(err.kind, ErrorKind::Configuration, "{idle}/{absolute}");
        }
    }
}
