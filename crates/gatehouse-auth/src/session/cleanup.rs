//! Periodic sweep of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use gatehouse_core::config::SessionConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use super::model::positive_duration;
use super::registry::SessionRegistry;

/// Runs expired-session sweeps against the registry.
///
/// Expired sessions are already ignored by every registry read; the sweep
/// only reclaims their memory.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Registry to sweep.
    registry: Arc<SessionRegistry>,
    /// Time between sweeps.
    interval: Duration,
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(registry: Arc<SessionRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Creates a cleanup handler sweeping every `cleanup_interval_minutes`.
    pub fn from_config(registry: Arc<SessionRegistry>, config: &SessionConfig) -> AppResult<Self> {
        let interval = positive_duration(
            "cleanup_interval_minutes",
            config.cleanup_interval_minutes,
            chrono::Duration::try_minutes,
        )?
        .to_std()
        .map_err(|e| AppError::configuration(format!("session.cleanup_interval_minutes: {e}")))?;

        Ok(Self::new(registry, interval))
    }

    /// Time between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs a single cleanup cycle. Returns the number of sessions removed.
    pub fn run_cleanup(&self) -> usize {
        let cleaned = self.registry.purge_expired();

        if cleaned > 0 {
            info!(cleaned = cleaned, "Session cleanup completed");
        } else {
            debug!("Session cleanup found nothing to remove");
        }

        cleaned
    }

    /// Sweeps on every interval tick until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cleanup();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Session cleanup stopping");
                        break;
                    }
                }
            }
        }
    }
}
