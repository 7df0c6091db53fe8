//! Route definitions for the Gatehouse HTTP adapter.
//!
//! Login, logout, and access-denied routes are mounted at their configured
//! paths. The access middleware wraps every route, so the gate decides
//! admission before any handler runs.

use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Path of the identity endpoint.
pub const WHOAMI_PATH: &str = "/me";

/// Build the complete Axum router with all routes and middleware.
///
/// The configured login, logout, access-denied, success, and failure paths
/// must be distinct from each other (success and failure may coincide).
pub fn build_router(state: AppState) -> Router {
    let auth = state.config.auth.clone();

    let mut router = Router::new()
        .route(
            &auth.login_page,
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route(
            &auth.logout_url,
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
        .route(&auth.access_denied_page, get(handlers::auth::access_denied))
        .route(&auth.default_success_url, get(handlers::pages::index))
        .route(WHOAMI_PATH, get(handlers::pages::whoami));

    if auth.failure_url != auth.default_success_url {
        router = router.route(&auth.failure_url, get(handlers::pages::login_failed));
    }

    router
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::access::require_access,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
