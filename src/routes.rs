use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{protected, public};
use crate::middleware::require_admin;
use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(session_routes())
        // Admin only
        .merge(dashboard_routes(state.clone()))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(public::login_get).post(public::login_post))
        .route("/logout", get(public::logout_get))
}

fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(protected::overview_get))
        .route("/dashboard/users", get(protected::users_get))
        .route("/dashboard/clouds", get(protected::clouds_get))
        .route("/dashboard/billing", get(protected::billing_get))
        .route("/dashboard/system", get(protected::system_get))
        .route("/dashboard/debug", get(protected::debug_get))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
