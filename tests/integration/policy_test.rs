//! Integration tests for the security chain and authorization policy.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_anonymous_is_sent_to_login_page() {
    let app = helpers::TestApp::new();

    for path in ["/index.html", "/admin/users", "/anything"] {
        let response = app.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location.as_deref(), Some("/login.html"), "{path}");
    }
}

#[tokio::test]
async fn test_allowlisted_pages_need_no_session() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/hi", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("hi"));

    let response = app.request("GET", "/login.html", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn test_access_denied_page_is_reachable() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/403.html", None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.contains("Access denied"));
}

#[tokio::test]
async fn test_ignored_paths_bypass_the_chain() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/css/site.css", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/css"))
    );

    let response = app.request("GET", "/static/missing.js", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_area_requires_admin_role() {
    let app = helpers::TestApp::new();
    let alice = app.login_ok("alice", "secret").await;
    let admin = app.login_ok("admin", "admin").await;

    let response = app.request("GET", "/admin/users", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/403.html"));

    // Allowed through the chain; no route is mounted there.
    let response = app.request("GET", "/admin/users", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authenticated_user_reaches_protected_pages() {
    let app = helpers::TestApp::new();
    let alice = app.login_ok("alice", "secret").await;

    let response = app.request("GET", "/index.html", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Welcome, alice"));
}

#[tokio::test]
async fn test_unknown_session_is_anonymous() {
    let app = helpers::TestApp::new();
    let forged = "00000000-0000-4000-8000-000000000000";

    let response = app.request("GET", "/index.html", Some(forged)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html"));
}

#[tokio::test]
async fn test_dot_segments_are_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/static/../admin/users", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_custom_rule_table() {
    let mut config = helpers::test_config();
    config.policy = gatehouse_core::config::AppConfig::from_toml(
        r#"
        [policy]
        permit_all = ["/hi"]

        [[policy.rules]]
        pattern = "/reports/**"
        methods = ["POST"]
        require = "deny_all"

        [[policy.rules]]
        pattern = "/**"
        require = "authenticated"
        "#,
    )
    .expect("config")
    .policy;
    let app = helpers::TestApp::with_config(config);
    let alice = app.login_ok("alice", "secret").await;

    let response = app.request("GET", "/reports/q1", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("POST", "/reports/q1", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/403.html"));
}
