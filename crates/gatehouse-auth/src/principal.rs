//! The identity attached to a request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gatehouse_core::types::PrincipalId;

/// The authenticated identity associated with a request, or the anonymous
/// caller.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Account identifier; `None` for the anonymous principal.
    id: Option<PrincipalId>,
    /// Login name; empty for the anonymous principal.
    username: String,
    /// Granted roles.
    roles: BTreeSet<String>,
}

impl Principal {
    /// Creates an authenticated principal.
    pub fn authenticated(
        id: PrincipalId,
        username: impl Into<String>,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Creates the anonymous principal.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            username: String::new(),
            roles: BTreeSet::new(),
        }
    }

    /// Returns the account identifier, if authenticated.
    pub fn id(&self) -> Option<PrincipalId> {
        self.id
    }

    /// Returns the login name (empty when anonymous).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the granted roles.
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Whether this is the anonymous principal.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the principal holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Whether the principal holds at least one of `roles`.
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|r| self.has_role(r))
    }
}
