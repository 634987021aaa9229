//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gatehouse_api::AppState;
use gatehouse_auth::credential::MemoryCredentialStore;
use gatehouse_auth::password::PasswordHasher;
use gatehouse_core::config::{AppConfig, BootstrapUser, HashingConfig};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Credential store behind the login flow
    pub store: Arc<MemoryCredentialStore>,
    /// Application config
    pub config: AppConfig,
}

/// Stock configuration with cheap hashing and an extra non-admin account.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.hashing = HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config.auth.bootstrap_users.push(BootstrapUser {
        username: "alice".to_string(),
        password: "secret".to_string(),
        roles: vec!["USER".to_string()],
    });
    config
}

impl TestApp {
    /// Create a test application with [`test_config`].
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let hasher = Arc::new(PasswordHasher::new(&config.auth.hashing).expect("hasher"));
        let store = Arc::new(
            MemoryCredentialStore::with_bootstrap(&config.auth.bootstrap_users, &hasher)
                .expect("store"),
        );
        let state =
            gatehouse_api::build_state_with_store(config.clone(), store.clone(), hasher)
                .expect("state");
        let router = gatehouse_api::build_router(state.clone());

        Self {
            router,
            state,
            store,
            config,
        }
    }

    /// Cookie header value carrying `session`.
    pub fn cookie(&self, session: &str) -> String {
        format!("{}={}", self.config.auth.session_cookie_name, session)
    }

    /// Make a bodiless request.
    pub async fn request(&self, method: &str, path: &str, session: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(session) = session {
            req = req.header(COOKIE, self.cookie(session));
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// POST a urlencoded form. Field values must not need escaping.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        session: Option<&str>,
    ) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(session) = session {
            req = req.header(COOKIE, self.cookie(session));
        }
        self.send(req.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    /// Submit the login form with the configured field names.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let auth = &self.config.auth;
        self.post_form(
            &auth.login_processing_url,
            &[
                (auth.username_parameter.as_str(), username),
                (auth.password_parameter.as_str(), password),
            ],
            None,
        )
        .await
    }

    /// Log in and return the session token, failing the test otherwise.
    pub async fn login_ok(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(
            response.location.as_deref(),
            Some(self.config.auth.default_success_url.as_str()),
            "Login failed for {username}"
        );
        response
            .session_cookie(&self.config.auth.session_cookie_name)
            .expect("No session cookie in login response")
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            location,
            set_cookies,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// `Location` header, if any
    pub location: Option<String>,
    /// Raw `Set-Cookie` headers
    pub set_cookies: Vec<String>,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Body as text
    pub body: String,
}

impl TestResponse {
    /// Non-empty value set for cookie `name`.
    pub fn session_cookie(&self, name: &str) -> Option<String> {
        self.set_cookies.iter().find_map(|header| {
            let pair = header.split(';').next()?;
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name && !value.is_empty()).then(|| value.to_string())
        })
    }

    /// Whether a header clears cookie `name`.
    pub fn clears_cookie(&self, name: &str) -> bool {
        self.set_cookies.iter().any(|header| {
            header.starts_with(&format!("{name}=;"))
                || (header.starts_with(&format!("{name}=")) && header.contains("Max-Age=0"))
        })
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}
