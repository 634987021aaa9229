//! Session cookie and principal extractors.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use gatehouse_auth::principal::Principal;
use gatehouse_core::types::SessionId;

use crate::state::AppState;

/// Reads the session id from the named cookie. Malformed values are ignored.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// The session token presented by the client, if any.
#[derive(Debug, Clone, Copy)]
pub struct SessionToken(pub Option<SessionId>);

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_id_from_headers(
            &parts.headers,
            &state.config.auth.session_cookie_name,
        )))
    }
}

/// The principal attached by the security chain.
///
/// Anonymous when the route was reached through a bypass or allowlisted path.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl std::ops::Deref for CurrentPrincipal {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Principal>()
                .cloned()
                .unwrap_or_else(Principal::anonymous),
        ))
    }
}
