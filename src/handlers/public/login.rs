// handlers/public/login.rs - GET/POST /login
//
// Staff sign in (or request an account) with e-mail and password against the
// identity store. A successful sign-in stores the session in cookies and
// hands over to /dashboard, where the allow-list decides the rest.

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{append_cookies, session_cookies, NOT_AUTHORIZED};
use crate::error::AdminError;
use crate::render::{components, escape, layout};
use crate::state::AppState;
use crate::store::SignUpOutcome;

pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized. Contact admin to get access.";
pub const CONFIRM_EMAIL_MESSAGE: &str = "Check your email to confirm your account";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginAction {
    SignIn,
    SignUp,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub action: Option<LoginAction>,
}

/// GET /login[?error=not_authorized]
pub async fn login_get(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Response {
    if state.identity.is_none() {
        return login_unavailable(&state);
    }

    let message = match query.error.as_deref() {
        Some(NOT_AUTHORIZED) => Some(NOT_AUTHORIZED_MESSAGE),
        _ => None,
    };
    Html(login_page("", message)).into_response()
}

/// POST /login - form fields `email`, `password`, `action=sign_in|sign_up`.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let Some(identity) = state.identity.as_deref() else {
        return login_unavailable(&state);
    };

    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(login_page(email, Some("Email and password are required"))),
        )
            .into_response();
    }

    match form.action.unwrap_or(LoginAction::SignIn) {
        LoginAction::SignIn => match identity.sign_in_with_password(email, &form.password).await {
            Ok(session) => {
                info!("Signed in {}", session.principal.display_email());
                let mut response = Redirect::to("/dashboard").into_response();
                append_cookies(response.headers_mut(), session_cookies(&session, &state.config.session));
                response
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}", email, e);
                let message = e.payload().message;
                (StatusCode::UNAUTHORIZED, Html(login_page(email, Some(&message)))).into_response()
            }
        },
        LoginAction::SignUp => match identity.sign_up(email, &form.password).await {
            Ok(SignUpOutcome::SignedIn(session)) => {
                info!("Signed up and signed in {}", session.principal.display_email());
                let mut response = Redirect::to("/dashboard").into_response();
                append_cookies(response.headers_mut(), session_cookies(&session, &state.config.session));
                response
            }
            Ok(SignUpOutcome::ConfirmationPending(principal)) => {
                info!("Sign-up pending confirmation for {}", principal.display_email());
                Html(login_page(email, Some(CONFIRM_EMAIL_MESSAGE))).into_response()
            }
            Err(e) => {
                warn!("Sign-up failed for {}: {}", email, e);
                let message = e.payload().message;
                (StatusCode::BAD_REQUEST, Html(login_page(email, Some(&message)))).into_response()
            }
        },
    }
}

fn login_unavailable(state: &AppState) -> Response {
    let err = AdminError::missing_public_config(&state.config);
    let body = format!(
        "<div class=\"login\"><h1>Admin Login</h1>{}</div>",
        components::admin_error(&err)
    );
    (err.status_code(), Html(layout::bare_page("Admin Login", &body))).into_response()
}

fn login_page(email: &str, message: Option<&str>) -> String {
    let notice = message
        .map(|m| format!("<div class=\"panel error\">{}</div>", escape(m)))
        .unwrap_or_default();

    let body = format!(
        "<div class=\"login\"><h1>Admin Login</h1>\
<form method=\"post\" action=\"/login\">\
<label for=\"email\">Email<input id=\"email\" name=\"email\" type=\"email\" required value=\"{}\"></label>\
<label for=\"password\">Password<input id=\"password\" name=\"password\" type=\"password\" required></label>\
{}\
<div class=\"actions\">\
<button class=\"primary\" type=\"submit\" name=\"action\" value=\"sign_in\">Sign In</button>\
<button type=\"submit\" name=\"action\" value=\"sign_up\">Sign Up</button>\
</div></form></div>",
        escape(email),
        notice
    );
    layout::bare_page("Admin Login", &body)
}
