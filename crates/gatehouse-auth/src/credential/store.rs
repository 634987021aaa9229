//! Credential store trait and record type.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gatehouse_core::result::AppResult;
use gatehouse_core::types::PrincipalId;

use crate::principal::Principal;

/// A stored account credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Account identifier.
    pub id: PrincipalId,
    /// Login name.
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Granted roles.
    pub roles: BTreeSet<String>,
}

impl CredentialRecord {
    /// Builds the principal this credential authenticates as.
    pub fn to_principal(&self) -> Principal {
        Principal::authenticated(self.id, self.username.clone(), self.roles.iter().cloned())
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Resolves usernames to stored credentials.
///
/// `Ok(None)` means no such account. `Err` is reserved for the store being
/// unreachable and is treated as fatal by the login flow; it is never
/// retried or mapped to a login failure.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Looks up the credential for `username`.
    async fn lookup(&self, username: &str) -> AppResult<Option<CredentialRecord>>;
}
