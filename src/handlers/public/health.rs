// handlers/public/health.rs - GET / and GET /health

use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect},
};
use serde_json::json;

use crate::state::AppState;

/// GET / - the dashboard is the only thing to see here.
pub async fn root() -> Redirect {
    Redirect::to("/dashboard")
}

/// GET /health - liveness plus which store pairs are configured. Does not
/// touch the remote store.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "version": env!("CARGO_PKG_VERSION"),
            "project": state.config.project_ref(),
            "store": {
                "service": state.service.is_some(),
                "identity": state.identity.is_some(),
            }
        }
    }))
}
