// handlers/protected/billing.rs - GET /dashboard/billing

use axum::{
    extract::{Extension, State},
    response::Response,
};

use super::{page, render_listing};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::reports::{fetch_listing, SubscriptionRow};
use crate::state::AppState;

/// GET /dashboard/billing - subscriptions, newest first.
pub async fn billing_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let listing = fetch_listing::<SubscriptionRow, _>(state.service.as_deref(), state.config.reports.listing_limit).await;
    let (status, body) = render_listing(listing, AdminError::missing_server_config(&state.config));
    page(status, &principal, "Billing", "/dashboard/billing", &body)
}
