//! Integration tests for the login and logout endpoints.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use gatehouse_auth::credential::{CredentialRecord, CredentialStore};
use gatehouse_auth::password::PasswordHasher;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

const COOKIE: &str = "GATEHOUSE_SESSION";

#[tokio::test]
async fn test_login_success_redirects_to_default_page() {
    let app = helpers::TestApp::new();

    let response = app.login("admin", "admin").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/index.html"));
    assert!(response.session_cookie(COOKIE).is_some());

    let header = response
        .set_cookies
        .iter()
        .find(|h| h.starts_with(COOKIE))
        .expect("session cookie header");
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("Path=/"));
}

#[tokio::test]
async fn test_wrong_password_redirects_to_failure_page() {
    let app = helpers::TestApp::new();

    let response = app.login("admin", "wrong").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html?error"));
    assert!(response.session_cookie(COOKIE).is_none());
    assert_eq!(app.state.registry.active_count(), 0);
}

#[tokio::test]
async fn test_unknown_user_looks_like_wrong_password() {
    let app = helpers::TestApp::new();

    let unknown = app.login("nobody", "admin").await;
    let wrong = app.login("admin", "wrong").await;

    assert_eq!(unknown.status, wrong.status);
    assert_eq!(unknown.location, wrong.location);
    assert_eq!(unknown.set_cookies, wrong.set_cookies);
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn test_missing_fields_are_bad_credentials() {
    let app = helpers::TestApp::new();

    let response = app.post_form("/auth", &[("user_name", "admin")], None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html?error"));
}

#[tokio::test]
async fn test_session_cookie_grants_access() {
    let app = helpers::TestApp::new();
    let session = app.login_ok("admin", "admin").await;

    let response = app.request("GET", "/index.html", Some(&session)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Welcome, admin"));
    assert!(response.body.contains("ADMIN"));
}

#[tokio::test]
async fn test_logout_ends_session_and_clears_cookie() {
    let app = helpers::TestApp::new();
    let session = app.login_ok("admin", "admin").await;

    let response = app.request("GET", "/logout", Some(&session)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html?logout"));
    assert!(response.clears_cookie(COOKIE));
    assert_eq!(app.state.registry.active_count(), 0);

    let response = app.request("GET", "/index.html", Some(&session)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html"));
}

#[tokio::test]
async fn test_logout_without_session_still_redirects() {
    let app = helpers::TestApp::new();

    let response = app.request("POST", "/logout", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html?logout"));

    let response = app
        .request("POST", "/logout", Some("not-a-session-id"))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html?logout"));
}

#[tokio::test]
async fn test_login_page_shows_markers() {
    let app = helpers::TestApp::new();

    let plain = app.request("GET", "/login.html", None).await;
    assert_eq!(plain.status, StatusCode::OK);
    assert!(plain.body.contains("name=\"user_name\""));
    assert!(plain.body.contains("name=\"pass_word\""));
    assert!(!plain.body.contains("class=\"error\""));

    let failed = app.request("GET", "/login.html?error", None).await;
    assert!(failed.body.contains("class=\"error\""));

    let signed_out = app.request("GET", "/login.html?logout", None).await;
    assert!(signed_out.body.contains("class=\"notice\""));

    let mixed = app.request("GET", "/login.html?lang=en&logout", None).await;
    assert!(mixed.body.contains("class=\"notice\""));
    assert!(!mixed.body.contains("class=\"error\""));

    let lookalike = app.request("GET", "/login.html?errors=1", None).await;
    assert!(!lookalike.body.contains("class=\"error\""));
}

#[tokio::test]
async fn test_configured_field_names() {
    let mut config = helpers::test_config();
    config.auth.username_parameter = "login".to_string();
    config.auth.password_parameter = "secret".to_string();
    let app = helpers::TestApp::with_config(config);

    let response = app
        .post_form("/auth", &[("login", "admin"), ("secret", "admin")], None)
        .await;
    assert_eq!(response.location.as_deref(), Some("/index.html"));

    let response = app
        .post_form("/auth", &[("user_name", "admin"), ("pass_word", "admin")], None)
        .await;
    assert_eq!(response.location.as_deref(), Some("/login.html?error"));
}

#[derive(Debug)]
struct UnreachableStore;

#[async_trait]
impl CredentialStore for UnreachableStore {
    async fn lookup(&self, _username: &str) -> AppResult<Option<CredentialRecord>> {
        Err(AppError::infrastructure("credential backend unreachable"))
    }
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let config = helpers::test_config();
    let hasher = Arc::new(PasswordHasher::new(&config.auth.hashing).expect("hasher"));
    let state = gatehouse_api::build_state_with_store(config, Arc::new(UnreachableStore), hasher)
        .expect("state");
    let app = helpers::TestApp {
        router: gatehouse_api::build_router(state.clone()),
        state,
        store: Arc::new(Default::default()),
        config: helpers::test_config(),
    };

    let response = app.login("admin", "admin").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(app.state.registry.active_count(), 0);
}

#[tokio::test]
async fn test_session_survives_credential_removal() {
    let app = helpers::TestApp::new();
    let session = app.login_ok("alice", "secret").await;

    app.store.remove("alice");

    let response = app.request("GET", "/index.html", Some(&session)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.login("alice", "secret").await;
    assert_eq!(response.location.as_deref(), Some("/login.html?error"));
}
