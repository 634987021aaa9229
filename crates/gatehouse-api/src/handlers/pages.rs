//! Minimal HTML pages served behind the security chain.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};

use crate::extractors::CurrentPrincipal;
use crate::state::AppState;

const STYLESHEET: &str = "body { font-family: sans-serif; margin: 2rem; }\n\
.error { color: #b00020; }\n\
.notice { color: #1b5e20; }\n";

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/css/site.css\"></head><body>{body}</body></html>\n"
    ))
}

/// GET {login_page}
///
/// Shows a generic error marker after a failed login and a notice after
/// logout.
pub async fn login_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let auth = &state.config.auth;

    let mut body = String::from("<h1>Sign in</h1>");
    if params.contains_key("error") {
        body.push_str("<p class=\"error\">Invalid username or password.</p>");
    }
    if params.contains_key("logout") {
        body.push_str("<p class=\"notice\">You have been signed out.</p>");
    }
    body.push_str(&format!(
        "<form method=\"post\" action=\"{action}\">\
         <label>Username <input name=\"{user}\" autocomplete=\"username\"></label>\
         <label>Password <input type=\"password\" name=\"{pass}\" autocomplete=\"current-password\"></label>\
         <button type=\"submit\">Sign in</button></form>",
        action = escape_html(&auth.login_processing_url),
        user = escape_html(&auth.username_parameter),
        pass = escape_html(&auth.password_parameter),
    ));

    layout("Sign in", &body)
}

/// GET /index.html
pub async fn index(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Html<String> {
    let roles = principal
        .roles()
        .iter()
        .map(|r| escape_html(r))
        .collect::<Vec<_>>()
        .join(", ");

    layout(
        "Home",
        &format!(
            "<h1>Welcome, {user}</h1><p>Roles: {roles}</p>\
             <form method=\"post\" action=\"{logout}\"><button type=\"submit\">Sign out</button></form>",
            user = escape_html(principal.username()),
            logout = escape_html(&state.config.auth.logout_url),
        ),
    )
}

/// GET {access_denied_page}
pub async fn access_denied() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        layout(
            "Access denied",
            "<h1>Access denied</h1><p>You do not have permission to view this page.</p>",
        ),
    )
}

/// GET /hi
pub async fn hi() -> Html<String> {
    layout("Hi", "<p>hi</p>")
}

/// GET /css/site.css
pub async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Fallback for unknown paths that passed the security chain.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        layout("Not found", "<h1>Not found</h1>"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
