// Dashboard error taxonomy
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::auth::NOT_AUTHORIZED;
use crate::config::AppConfig;
use crate::render;
use crate::store::StoreError;

/// Every failure a dashboard request can end in. None of them escape as an
/// unhandled fault: each variant knows how to answer the browser.
#[derive(Debug, Error)]
pub enum AdminError {
    // 503: operator has to set the listed variables
    #[error("Admin panel is not configured: missing {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    // Soft: rendered as guidance, never as a failure
    // `introspection_available` is false when the table-listing procedure
    // itself is missing, so every table reads as absent.
    #[error("Table '{table}' does not exist in the schema yet")]
    SchemaDrift { table: String, introspection_available: bool },

    // 502: the store answered with an error
    #[error("{0}")]
    RemoteQuery(#[from] StoreError),

    // Redirect with reason code after a forced sign-out
    #[error("Not authorized. Contact admin to get access.")]
    Authorization,

    // Redirect to the entry point
    #[error("No active session")]
    SessionMissing,
}

impl AdminError {
    /// Configuration error naming the server-side variables that are unset.
    pub fn missing_server_config(config: &AppConfig) -> Self {
        let mut missing = Vec::new();
        if config.store.url.is_none() {
            missing.push("ADMIN_SUPABASE_URL");
        }
        if config.store.service_role_key.is_none() {
            missing.push("ADMIN_SUPABASE_SERVICE_ROLE_KEY");
        }
        AdminError::Configuration { missing }
    }

    /// Configuration error naming the session-handling variables that are unset.
    pub fn missing_public_config(config: &AppConfig) -> Self {
        let mut missing = Vec::new();
        if config.store.public_url.is_none() {
            missing.push("ADMIN_SUPABASE_PUBLIC_URL");
        }
        if config.store.anon_key.is_none() {
            missing.push("ADMIN_SUPABASE_ANON_KEY");
        }
        AdminError::Configuration { missing }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AdminError::SchemaDrift { .. } => StatusCode::OK,
            AdminError::RemoteQuery(_) => StatusCode::BAD_GATEWAY,
            AdminError::Authorization | AdminError::SessionMissing => StatusCode::SEE_OTHER,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Configuration { .. } => "CONFIGURATION_ERROR",
            AdminError::SchemaDrift { .. } => "SCHEMA_DRIFT",
            AdminError::RemoteQuery(_) => "REMOTE_QUERY_ERROR",
            AdminError::Authorization => "NOT_AUTHORIZED",
            AdminError::SessionMissing => "SESSION_MISSING",
        }
    }

    /// Login URL for the variants that resolve by redirect.
    pub fn login_location(&self) -> Option<String> {
        match self {
            AdminError::SessionMissing => Some("/login".to_string()),
            AdminError::Authorization => Some(format!("/login?error={}", NOT_AUTHORIZED)),
            _ => None,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if let Some(location) = self.login_location() {
            return Redirect::to(&location).into_response();
        }

        let body = render::components::admin_error(&self);
        let page = render::layout::bare_page("Admin Panel", &body);
        (self.status_code(), Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ErrorPayload;

    #[test]
    fn redirects_carry_reason_codes() {
        assert_eq!(AdminError::SessionMissing.login_location().as_deref(), Some("/login"));
        assert_eq!(
            AdminError::Authorization.login_location().as_deref(),
            Some("/login?error=not_authorized")
        );
        assert!(AdminError::Configuration { missing: vec![] }.login_location().is_none());
    }

    #[test]
    fn names_missing_variables() {
        let config = AppConfig::from_lookup(|key| match key {
            "ADMIN_SUPABASE_URL" => Some("https://abcdefgh.supabase.co".to_string()),
            _ => None,
        });
        match AdminError::missing_server_config(&config) {
            AdminError::Configuration { missing } => assert_eq!(missing, vec!["ADMIN_SUPABASE_SERVICE_ROLE_KEY"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn remote_errors_map_to_bad_gateway() {
        let err: AdminError = StoreError::remote(404, ErrorPayload::new("missing").with_code("42P01")).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "REMOTE_QUERY_ERROR");
        assert_eq!(err.to_string(), "missing (42P01)");
    }

    #[test]
    fn schema_drift_is_guidance_not_failure() {
        let err = AdminError::SchemaDrift {
            table: "clouds".into(),
            introspection_available: false,
        };
        assert_eq!(err.status_code(), StatusCode::OK);
        let html = crate::render::components::admin_error(&err);
        assert!(html.contains("Not configured yet"));
        assert!(html.contains("list_public_tables() is not installed"));

        let err = AdminError::SchemaDrift {
            table: "clouds".into(),
            introspection_available: true,
        };
        assert!(crate::render::components::admin_error(&err).contains("Run the SQL migration"));
    }
}
