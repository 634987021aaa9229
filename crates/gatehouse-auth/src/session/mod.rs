//! Session lifecycle: admission, activity tracking, invalidation, expiry.

pub mod cleanup;
pub mod model;
pub mod registry;

pub use cleanup::SessionCleanup;
pub use model::{Session, SessionPolicy};
pub use registry::{Admission, SessionRegistry};
