// handlers/protected/users.rs - GET /dashboard/users

use axum::{
    extract::{Extension, State},
    response::Response,
};

use super::{page, render_listing};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::reports::{fetch_listing, UserRow};
use crate::state::AppState;

/// GET /dashboard/users - the most recent rows of `users`, newest first.
pub async fn users_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let listing = fetch_listing::<UserRow, _>(state.service.as_deref(), state.config.reports.listing_limit).await;
    let (status, body) = render_listing(listing, AdminError::missing_server_config(&state.config));
    page(status, &principal, "Users", "/dashboard/users", &body)
}
