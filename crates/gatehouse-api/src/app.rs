//! Application builder: wires the auth components into `AppState`.

use std::sync::Arc;

use tracing::info;

use gatehouse_auth::credential::{CredentialStore, MemoryCredentialStore};
use gatehouse_auth::login::LoginFlow;
use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::policy::{PolicyEngine, PrincipalResolver};
use gatehouse_auth::session::{SessionPolicy, SessionRegistry};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;

use crate::middleware::security::SecurityChain;
use crate::state::AppState;

/// Builds every component from `config` with the in-memory credential store
/// seeded from the bootstrap users.
pub fn build_state(config: AppConfig) -> AppResult<AppState> {
    let hasher = Arc::new(PasswordHasher::new(&config.auth.hashing)?);
    let store = MemoryCredentialStore::with_bootstrap(&config.auth.bootstrap_users, &hasher)?;
    info!(accounts = store.len(), "Credential store ready");

    build_state_with_store(config, Arc::new(store), hasher)
}

/// Builds every component from `config` around an existing credential store.
pub fn build_state_with_store(
    config: AppConfig,
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
) -> AppResult<AppState> {
    let session_policy = SessionPolicy::try_from(&config.session)?;
    info!(
        max_sessions = ?session_policy.max_sessions,
        overflow = %session_policy.overflow,
        "Session registry ready"
    );
    let registry = Arc::new(SessionRegistry::new(session_policy));

    let resolver: Arc<dyn PrincipalResolver> = registry.clone();
    let policy = Arc::new(PolicyEngine::from_config(
        &config.policy,
        &config.auth,
        resolver,
    )?);

    let login = Arc::new(LoginFlow::new(
        credentials,
        hasher,
        Arc::clone(&registry),
        &config.auth,
    )?);

    let security_chain = Arc::new(SecurityChain::from_config(&config.policy, &config.auth)?);

    Ok(AppState {
        config: Arc::new(config),
        registry,
        policy,
        login,
        security_chain,
    })
}
