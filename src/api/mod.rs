//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints of the newsdesk API:
//! - Auth endpoints (register/login/logout/me)
//! - User endpoints
//! - Category endpoints
//! - News endpoints (including revisions and revert)
//! - Upload endpoints
//!
//! Routes are grouped into three tiers: public, authenticated, and admin.
//! Authorization middleware rejects callers before handlers run; the
//! services repeat the role checks so the policy holds regardless of the
//! transport wiring.

pub mod auth;
pub mod categories;
pub mod common;
pub mod middleware;
pub mod news;
pub mod upload;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/users", users::admin_router())
        .nest("/categories", categories::admin_router())
        .nest("/news", news::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/users", users::protected_router())
        .nest("/categories", categories::protected_router())
        .nest("/news", news::protected_router())
        .nest("/upload", upload::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/users", users::public_router())
        .nest("/categories", categories::public_router())
        .nest("/news", news::public_router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
