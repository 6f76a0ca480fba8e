// handlers/protected/mod.rs - Dashboard pages
//
// Route prefix: /dashboard
// Middleware: require_admin (session + allow-list). Every handler here
// receives the AdminPrincipal the gate inserted.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::render::{components, layout};
use crate::reports::{Listing, ReportRow};

pub mod billing;
pub mod clouds;
pub mod debug;
pub mod overview;
pub mod system;
pub mod users;

pub use billing::billing_get;
pub use clouds::clouds_get;
pub use debug::debug_get;
pub use overview::overview_get;
pub use system::system_get;
pub use users::users_get;

/// Wrap a page body in the dashboard layout.
pub(crate) fn page(status: StatusCode, principal: &AdminPrincipal, title: &str, path: &str, body: &str) -> Response {
    let html = layout::dashboard_page(title, path, principal.0.display_email(), body);
    (status, Html(html)).into_response()
}

/// Dashboard page showing an [`AdminError`] in place of content.
pub(crate) fn error_page(err: &AdminError, principal: &AdminPrincipal, title: &str, path: &str) -> Response {
    page(err.status_code(), principal, title, path, &components::admin_error(err))
}

/// Body and status for a listing page, one branch per [`Listing`] outcome.
pub(crate) fn render_listing<T: ReportRow>(listing: Listing<T>, config_error: AdminError) -> (StatusCode, String) {
    match listing {
        Listing::NotConfigured => (config_error.status_code(), components::admin_error(&config_error)),
        Listing::TableMissing { table, introspection_available } => {
            let err = AdminError::SchemaDrift {
                table: table.to_string(),
                introspection_available,
            };
            (err.status_code(), components::admin_error(&err))
        }
        Listing::Failed(e) => {
            let err = AdminError::RemoteQuery(e);
            (err.status_code(), components::admin_error(&err))
        }
        Listing::Rows(rows) => {
            let cells: Vec<Vec<String>> = rows.iter().map(T::cells).collect();
            (StatusCode::OK, components::data_table(T::headers(), &cells, T::EMPTY_MESSAGE))
        }
    }
}
