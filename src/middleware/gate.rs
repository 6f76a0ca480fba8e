use axum::{
    extract::{Request, State},
    http::{header::CACHE_CONTROL, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{
    append_cookies, clear_session_cookies, session_cookies, AdminPrincipal, AuthorizationGate, GateOutcome,
    SessionTokens,
};
use crate::error::AdminError;
use crate::state::AppState;

/// Admin-only gate for `/dashboard` routes. Handlers behind it can rely on
/// an [`AdminPrincipal`] extension being present.
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(identity) = state.identity.as_deref() else {
        return AdminError::missing_public_config(&state.config).into_response();
    };

    let tokens = SessionTokens::from_headers(request.headers());
    let had_cookies = tokens.is_some();

    match AuthorizationGate::new(identity).check(tokens).await {
        GateOutcome::SessionMissing => {
            let mut response = AdminError::SessionMissing.into_response();
            if had_cookies {
                append_cookies(response.headers_mut(), clear_session_cookies(&state.config.session));
            }
            response
        }
        GateOutcome::Unauthorized { principal } => {
            tracing::info!("Signed out non-admin principal {}", principal.display_email());
            let mut response = AdminError::Authorization.into_response();
            append_cookies(response.headers_mut(), clear_session_cookies(&state.config.session));
            response
        }
        GateOutcome::Authorized { principal, refreshed } => {
            request.extensions_mut().insert(AdminPrincipal(principal));

            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            if let Some(session) = refreshed {
                append_cookies(headers, session_cookies(&session, &state.config.session));
            }
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        // Cookies stay: the session may well be valid once the directory is back.
        GateOutcome::StoreUnavailable(e) => AdminError::RemoteQuery(e).into_response(),
    }
}
