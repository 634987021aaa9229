//! Session registry configuration.

use serde::{Deserialize, Serialize};

/// Session lifetime and concurrency configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle timeout in minutes before a session stops being live.
    pub idle_timeout_minutes: u64,
    /// Absolute session lifetime in hours, regardless of activity.
    pub absolute_timeout_hours: u64,
    /// Interval between expired-session sweeps, in minutes.
    pub cleanup_interval_minutes: u64,
    /// Concurrent session limits.
    pub limits: SessionLimitsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 30,
            absolute_timeout_hours: 12,
            cleanup_interval_minutes: 15,
            limits: SessionLimitsConfig::default(),
        }
    }
}

/// Concurrent session limits configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimitsConfig {
    /// Whether concurrent session limits are enforced.
    pub enabled: bool,
    /// Maximum live sessions per principal. `1` is the single-session policy.
    pub max_sessions: u32,
    /// What happens when a principal is already at the limit.
    pub overflow_strategy: OverflowStrategy,
}

impl Default for SessionLimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_sessions: 1,
            overflow_strategy: OverflowStrategy::default(),
        }
    }
}

/// Strategy applied when a principal tries to exceed its session limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Reject the new login while the existing sessions are live.
    #[default]
    Deny,
    /// Invalidate the oldest live session to make room.
    KickOldest,
}

impl std::fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowStrategy::Deny => write!(f, "deny"),
            OverflowStrategy::KickOldest => write!(f, "kick_oldest"),
        }
    }
}
