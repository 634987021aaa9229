//! Access voters: statically typed checks combined by the policy engine.

use std::sync::Arc;

use gatehouse_core::config::{AccessRuleConfig, RuleRequirement};
use gatehouse_core::error::AppError;

use crate::principal::Principal;

use super::engine::AccessRequest;
use super::matcher::PathMatcher;

/// A single voter's opinion on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// Allow the request.
    Grant,
    /// No opinion.
    Abstain,
    /// Refuse the request.
    Deny,
}

/// One check evaluated by the policy engine.
pub trait AccessVoter: Send + Sync + std::fmt::Debug {
    /// Name used in decision reasons and logs.
    fn name(&self) -> &str;

    /// Votes on `request` made by `principal`.
    fn vote(&self, principal: &Principal, request: &AccessRequest<'_>) -> Vote;
}

/// What a rule demands of the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Always grant.
    PermitAll,
    /// Grant to any authenticated principal.
    Authenticated,
    /// Grant when the principal holds at least one role.
    AnyRole(Vec<String>),
    /// Always deny.
    DenyAll,
}

impl Requirement {
    fn is_satisfied_by(&self, principal: &Principal) -> bool {
        match self {
            Self::PermitAll => true,
            Self::Authenticated => !principal.is_anonymous(),
            Self::AnyRole(roles) => principal.has_any_role(roles.iter().map(String::as_str)),
            Self::DenyAll => false,
        }
    }
}

/// A row of the rule table.
#[derive(Debug, Clone)]
pub struct AccessRule {
    matcher: PathMatcher,
    /// Upper-cased methods; empty matches every method.
    methods: Vec<String>,
    requirement: Requirement,
}

impl AccessRule {
    /// Creates a rule for every method.
    pub fn new(pattern: &str, requirement: Requirement) -> Result<Self, AppError> {
        Ok(Self {
            matcher: PathMatcher::new(pattern)?,
            methods: Vec::new(),
            requirement,
        })
    }

    /// Restricts the rule to the given methods.
    pub fn with_methods<S: AsRef<str>>(mut self, methods: &[S]) -> Self {
        self.methods = methods
            .iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    fn applies_to(&self, request: &AccessRequest<'_>) -> bool {
        (self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(request.method)))
            && self.matcher.matches(request.path)
    }
}

impl TryFrom<&AccessRuleConfig> for AccessRule {
    type Error = AppError;

    fn try_from(config: &AccessRuleConfig) -> Result<Self, Self::Error> {
        let requirement = match config.require {
            RuleRequirement::PermitAll => Requirement::PermitAll,
            RuleRequirement::Authenticated => Requirement::Authenticated,
            RuleRequirement::DenyAll => Requirement::DenyAll,
            RuleRequirement::AnyRole => {
                if config.roles.is_empty() {
                    return Err(AppError::configuration(format!(
                        "Rule for '{}' requires any_role but lists no roles",
                        config.pattern
                    )));
                }
                Requirement::AnyRole(config.roles.clone())
            }
        };

        Ok(Self::new(&config.pattern, requirement)?.with_methods(&config.methods))
    }
}

/// Data-driven voter over an ordered rule table.
///
/// The first rule matching the request votes; with no match it abstains.
#[derive(Debug, Clone, Default)]
pub struct RuleVoter {
    rules: Vec<AccessRule>,
}

impl RuleVoter {
    /// Creates a voter from rules in priority order.
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Builds the rule table from configuration.
    pub fn from_config(rules: &[AccessRuleConfig]) -> Result<Self, AppError> {
        let rules = rules
            .iter()
            .map(AccessRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }
}

impl AccessVoter for RuleVoter {
    fn name(&self) -> &str {
        "rule_table"
    }

    fn vote(&self, principal: &Principal, request: &AccessRequest<'_>) -> Vote {
        match self.rules.iter().find(|rule| rule.applies_to(request)) {
            Some(rule) if rule.requirement.is_satisfied_by(principal) => Vote::Grant,
            Some(_) => Vote::Deny,
            None => Vote::Abstain,
        }
    }
}

type Predicate = dyn Fn(&Principal, &AccessRequest<'_>) -> bool + Send + Sync;

/// Voter backed by a plain function: `true` grants, `false` denies.
#[derive(Clone)]
pub struct PredicateVoter {
    name: String,
    predicate: Arc<Predicate>,
}

impl PredicateVoter {
    /// Wraps `predicate` under `name`.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Principal, &AccessRequest<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl std::fmt::Debug for PredicateVoter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateVoter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AccessVoter for PredicateVoter {
    fn name(&self) -> &str {
        &self.name
    }

    fn vote(&self, principal: &Principal, request: &AccessRequest<'_>) -> Vote {
        if (self.predicate)(principal, request) {
            Vote::Grant
        } else {
            Vote::Deny
        }
    }
}
