//! # gatehouse-api
//!
//! HTTP layer for Gatehouse built on Axum.
//!
//! Provides the ordered security chain middleware, the login/logout
//! endpoints, the HTML pages, request logging and error mapping.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_state, build_state_with_store};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
