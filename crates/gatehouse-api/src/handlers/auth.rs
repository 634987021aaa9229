//! Login and logout endpoints.

use std::collections::HashMap;

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use gatehouse_auth::login::LoginOutcome;

use crate::error::ApiError;
use crate::extractors::SessionToken;
use crate::state::AppState;

/// POST {login_processing_url}
///
/// Reads the configured username/password fields from the form. Success
/// ends any session the client presented and sets the new session cookie;
/// every outcome ends in a 303 redirect.
pub async fn login(
    State(state): State<AppState>,
    SessionToken(previous): SessionToken,
    jar: CookieJar,
    Form(form): Form<HashMap<String, String>>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let auth = &state.config.auth;
    let username = form
        .get(&auth.username_parameter)
        .map(String::as_str)
        .unwrap_or("");
    let password = form
        .get(&auth.password_parameter)
        .map(String::as_str)
        .unwrap_or("");

    let outcome = state
        .login
        .authenticate_replacing(previous, username, password)
        .await?;

    match outcome {
        LoginOutcome::Admitted { session, redirect } => {
            let cookie = Cookie::build((auth.session_cookie_name.clone(), session.id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            Ok((jar.add(cookie), Redirect::to(&redirect)))
        }
        LoginOutcome::Rejected { redirect, .. } => Ok((jar, Redirect::to(&redirect))),
    }
}

/// GET|POST {logout_url}
///
/// Always succeeds: the cookie is removed and the client is sent to the
/// logout success page whether or not the session was live.
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let outcome = state.login.logout(session_id).await;

    let expired = Cookie::build((state.config.auth.session_cookie_name.clone(), "")).path("/");
    (jar.remove(expired), Redirect::to(&outcome.redirect))
}
