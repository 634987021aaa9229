//! # gatehouse-auth
//!
//! Authentication and authorization engine for Gatehouse.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and verification
//! - `credential`: Username → credential lookup and bootstrap seeding
//! - `session`: Session registry with per-principal admission control
//! - `policy`: Affirmative-based authorization decisions over ordered voters
//! - `login`: Login/logout flow and its success, failure and logout callbacks

pub mod credential;
pub mod login;
pub mod password;
pub mod policy;
pub mod principal;
pub mod session;

pub use credential::{CredentialRecord, CredentialStore, MemoryCredentialStore};
pub use login::{LoginFlow, LoginOutcome, LoginState, LogoutOutcome, RejectReason};
pub use password::PasswordHasher;
pub use policy::{AccessRequest, PolicyDecision, PolicyEngine};
pub use principal::Principal;
pub use session::{Admission, Session, SessionCleanup, SessionPolicy, SessionRegistry};
