// handlers/public/logout.rs - GET /logout

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use crate::auth::{append_cookies, clear_session_cookies, SessionTokens};
use crate::state::AppState;

/// GET /logout - revoke the session remotely, drop the cookies, back to /login.
/// Always ends at /login, even when remote sign-out fails.
pub async fn logout_get(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let (Some(tokens), Some(identity)) = (SessionTokens::from_headers(&headers), state.identity.as_deref()) {
        match identity.sign_out(&tokens.access_token).await {
            Ok(()) => info!("Session signed out"),
            Err(e) => warn!("Remote sign-out failed: {}", e),
        }
    }

    let mut response = Redirect::to("/login").into_response();
    append_cookies(response.headers_mut(), clear_session_cookies(&state.config.session));
    response
}
