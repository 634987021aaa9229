//! In-memory credential store with bootstrap seeding.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use gatehouse_core::config::BootstrapUser;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::PrincipalId;

use crate::password::PasswordHasher;

use super::store::{CredentialRecord, CredentialStore};

/// Credential store backed by a concurrent map keyed by username.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    records: Arc<DashMap<String, CredentialRecord>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the configured bootstrap accounts.
    ///
    /// Plaintext passwords are hashed here and never stored.
    pub fn with_bootstrap(users: &[BootstrapUser], hasher: &PasswordHasher) -> AppResult<Self> {
        let store = Self::new();

        for user in users {
            if user.username.is_empty() {
                return Err(AppError::configuration(
                    "Bootstrap user must have a non-empty username",
                ));
            }

            let password_hash = hasher.hash_password(&user.password)?;
            store.insert(CredentialRecord {
                id: PrincipalId::new(),
                username: user.username.clone(),
                password_hash,
                roles: user.roles.iter().cloned().collect(),
            });

            info!(username = %user.username, roles = ?user.roles, "Bootstrap credential seeded");
        }

        Ok(store)
    }

    /// Inserts or replaces the credential for its username.
    pub fn insert(&self, record: CredentialRecord) {
        self.records.insert(record.username.clone(), record);
    }

    /// Removes the credential for `username`, returning it if present.
    ///
    /// Live sessions of the removed account are left untouched.
    pub fn remove(&self, username: &str) -> Option<CredentialRecord> {
        self.records.remove(username).map(|(_, record)| record)
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lookup(&self, username: &str) -> AppResult<Option<CredentialRecord>> {
        Ok(self.records.get(username).map(|r| r.value().clone()))
    }
}
