//! Integration tests for the concurrent session limit.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;

use gatehouse_core::config::OverflowStrategy;

const COOKIE: &str = "GATEHOUSE_SESSION";

#[tokio::test]
async fn test_second_login_rejected_while_session_live() {
    let app = helpers::TestApp::new();
    let first = app.login_ok("admin", "admin").await;

    let second = app.login("admin", "admin").await;

    assert_eq!(second.status, StatusCode::SEE_OTHER);
    assert_eq!(second.location.as_deref(), Some("/login.html?error"));
    assert!(second.session_cookie(COOKIE).is_none());

    let response = app.request("GET", "/index.html", Some(&first)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_limit_failure_matches_bad_credentials() {
    let app = helpers::TestApp::new();
    app.login_ok("admin", "admin").await;

    let limited = app.login("admin", "admin").await;
    let wrong = app.login("admin", "wrong").await;

    assert_eq!(limited.status, wrong.status);
    assert_eq!(limited.location, wrong.location);
}

#[tokio::test]
async fn test_login_after_logout_succeeds() {
    let app = helpers::TestApp::new();
    let first = app.login_ok("admin", "admin").await;

    app.request("POST", "/logout", Some(&first)).await;

    let second = app.login_ok("admin", "admin").await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_switching_account_releases_previous_session() {
    let app = helpers::TestApp::new();
    let alice = app.login_ok("alice", "secret").await;

    let auth = &app.config.auth;
    let response = app
        .post_form(
            &auth.login_processing_url,
            &[
                (auth.username_parameter.as_str(), "admin"),
                (auth.password_parameter.as_str(), "admin"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/index.html"));
    assert!(response.session_cookie(COOKIE).is_some());
    assert_eq!(app.state.registry.active_count(), 1);

    let response = app.request("GET", "/index.html", Some(&alice)).await;
    assert_eq!(response.location.as_deref(), Some("/login.html"));

    app.login_ok("alice", "secret").await;
}

#[tokio::test]
async fn test_relogin_with_own_cookie_is_admitted() {
    let app = helpers::TestApp::new();
    let first = app.login_ok("admin", "admin").await;

    let response = app
        .post_form("/auth", &[("user_name", "admin"), ("pass_word", "admin")], Some(&first))
        .await;
    assert_eq!(response.location.as_deref(), Some("/index.html"));
    assert_eq!(app.state.registry.active_count(), 1);
}

#[tokio::test]
async fn test_limit_is_per_account() {
    let app = helpers::TestApp::new();
    app.login_ok("admin", "admin").await;
    app.login_ok("alice", "secret").await;

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.json()["active_sessions"], 2);
}

#[tokio::test]
async fn test_kick_oldest_replaces_previous_session() {
    let mut config = helpers::test_config();
    config.session.limits.overflow_strategy = OverflowStrategy::KickOldest;
    let app = helpers::TestApp::with_config(config);

    let first = app.login_ok("admin", "admin").await;
    let second = app.login_ok("admin", "admin").await;

    let response = app.request("GET", "/index.html", Some(&first)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login.html"));

    let response = app.request("GET", "/index.html", Some(&second)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_limits_disabled_allows_parallel_sessions() {
    let mut config = helpers::test_config();
    config.session.limits.enabled = false;
    let app = helpers::TestApp::with_config(config);

    for _ in 0..3 {
        app.login_ok("admin", "admin").await;
    }
    assert_eq!(app.state.registry.active_count(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_admit_exactly_one() {
    for _ in 0..10 {
        let app = Arc::new(helpers::TestApp::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let app = Arc::clone(&app);
                tokio::spawn(async move { app.login("admin", "admin").await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            let response = handle.await.expect("join");
            if response.session_cookie(COOKIE).is_some() {
                admitted += 1;
            } else {
                assert_eq!(response.location.as_deref(), Some("/login.html?error"));
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(app.state.registry.active_count(), 1);
    }
}
