//! Authorization policy configuration.

use serde::{Deserialize, Serialize};

/// Path patterns and access rules consumed by the policy engine.
///
/// Patterns are Ant-style: `*` matches within one path segment and `**`
/// matches any number of segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Patterns that bypass the security chain entirely (static assets).
    pub ignored: Vec<String>,
    /// Patterns any caller may access, authenticated or not.
    pub permit_all: Vec<String>,
    /// Grant when every voter abstains.
    pub allow_if_all_abstain: bool,
    /// Ordered access rules; the first matching rule votes.
    pub rules: Vec<AccessRuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            ignored: vec!["/static/**".to_string(), "/css/**".to_string()],
            permit_all: vec![
                "/hi".to_string(),
                "/login.html".to_string(),
                "/auth".to_string(),
                "/health".to_string(),
            ],
            allow_if_all_abstain: false,
            rules: vec![
                AccessRuleConfig {
                    pattern: "/admin/**".to_string(),
                    methods: Vec::new(),
                    require: RuleRequirement::AnyRole,
                    roles: vec!["ADMIN".to_string()],
                },
                AccessRuleConfig {
                    pattern: "/**".to_string(),
                    methods: Vec::new(),
                    require: RuleRequirement::Authenticated,
                    roles: Vec::new(),
                },
            ],
        }
    }
}

/// One row of the access rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRuleConfig {
    /// Path pattern the rule applies to.
    pub pattern: String,
    /// HTTP methods the rule applies to; empty means all.
    #[serde(default)]
    pub methods: Vec<String>,
    /// What the principal must satisfy.
    pub require: RuleRequirement,
    /// Roles for [`RuleRequirement::AnyRole`].
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Requirement attached to an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRequirement {
    /// Always grant.
    PermitAll,
    /// Grant to any authenticated principal.
    Authenticated,
    /// Grant when the principal holds at least one of the listed roles.
    AnyRole,
    /// Always deny.
    DenyAll,
}
