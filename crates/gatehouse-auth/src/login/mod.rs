//! Login flow and its callbacks.

pub mod flow;
pub mod handlers;

pub use flow::{LoginFlow, LoginOutcome, LoginState, LogoutOutcome, RejectReason};
pub use handlers::{
    AuditLogoutHandler, AuthFailure, AuthenticationFailureHandler, AuthenticationSuccessHandler,
    LogoutHandler, RedirectFailureHandler, RedirectSuccessHandler,
};
