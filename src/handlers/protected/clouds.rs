// handlers/protected/clouds.rs - GET /dashboard/clouds

use axum::{
    extract::{Extension, State},
    response::Response,
};

use super::{page, render_listing};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::reports::{fetch_listing, CloudRow};
use crate::state::AppState;

/// GET /dashboard/clouds - registered clouds, newest first.
pub async fn clouds_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let listing = fetch_listing::<CloudRow, _>(state.service.as_deref(), state.config.reports.listing_limit).await;
    let (status, body) = render_listing(listing, AdminError::missing_server_config(&state.config));
    page(status, &principal, "Clouds", "/dashboard/clouds", &body)
}
