//! Custom Axum extractors.

pub mod session;

pub use session::{CurrentPrincipal, SessionToken};
