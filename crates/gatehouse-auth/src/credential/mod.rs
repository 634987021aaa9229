//! Credential lookup.
//!
//! The store is the only place password hashes live. Lookups are
//! side-effect-free; provisioning happens through bootstrap seeding.

pub mod memory;
pub mod store;

pub use memory::MemoryCredentialStore;
pub use store::{CredentialRecord, CredentialStore};
