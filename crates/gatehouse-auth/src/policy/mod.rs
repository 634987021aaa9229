//! Request authorization.
//!
//! The engine short-circuits on the permit-all allowlist, rejects anonymous
//! callers, then combines statically typed voters affirmatively: one grant
//! is enough.

pub mod engine;
pub mod matcher;
pub mod voter;

pub use engine::{AccessRequest, Authorization, PolicyDecision, PolicyEngine, PrincipalResolver};
pub use matcher::PathMatcher;
pub use voter::{AccessRule, AccessVoter, PredicateVoter, Requirement, RuleVoter, Vote};
