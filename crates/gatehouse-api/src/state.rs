//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatehouse_auth::login::LoginFlow;
use gatehouse_auth::policy::PolicyEngine;
use gatehouse_auth::session::SessionRegistry;
use gatehouse_core::config::AppConfig;

use crate::middleware::security::SecurityChain;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Live sessions
    pub registry: Arc<SessionRegistry>,
    /// Authorization decisions
    pub policy: Arc<PolicyEngine>,
    /// Login/logout orchestration
    pub login: Arc<LoginFlow>,
    /// Ordered request filter stages
    pub security_chain: Arc<SecurityChain>,
}
