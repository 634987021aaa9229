//! Route definitions for the Gatehouse HTTP surface.
//!
//! Login, logout and page paths come from `AuthConfig`; every route sits
//! behind the security chain.

use axum::{Router, middleware as axum_middleware, routing::get, routing::post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use gatehouse_core::config::AuthConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Layers run outermost first: HTTP tracing, request logging, then the
/// security chain.
pub fn build_router(state: AppState) -> Router {
    let auth = state.config.auth.clone();

    Router::new()
        .merge(auth_routes(&auth))
        .merge(page_routes(&auth))
        .route("/health", get(handlers::health::health))
        .fallback(handlers::pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::logging::request_logging))
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::security::security_filter,
                )),
        )
        .with_state(state)
}

/// Login processing and logout.
fn auth_routes(auth: &AuthConfig) -> Router<AppState> {
    Router::new()
        .route(&auth.login_processing_url, post(handlers::auth::login))
        .route(
            &auth.logout_url,
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
}

/// HTML pages and static assets.
fn page_routes(auth: &AuthConfig) -> Router<AppState> {
    Router::new()
        .route(&auth.login_page, get(handlers::pages::login_page))
        .route(&auth.access_denied_page, get(handlers::pages::access_denied))
        .route("/index.html", get(handlers::pages::index))
        .route("/hi", get(handlers::pages::hi))
        .route("/css/site.css", get(handlers::pages::stylesheet))
}
