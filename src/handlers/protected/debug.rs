// handlers/protected/debug.rs - GET /dashboard/debug
//
// Diagnostics for operators wiring the dashboard to a project: which project
// the keys point at, whether the table-listing procedure is installed, and
// which expected tables the live schema lacks.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Response,
};
use tracing::warn;

use super::{error_page, page};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::render::{components, escape};
use crate::schema::{missing_from, SchemaInspector, EXPECTED_TABLES, LIST_TABLES_INSTALL_SQL, LIST_TABLES_PROCEDURE};
use crate::state::AppState;

const TITLE: &str = "Debug Info";
const PATH: &str = "/dashboard/debug";

pub async fn debug_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let Some(store) = state.service.as_deref() else {
        return error_page(&AdminError::missing_server_config(&state.config), &principal, TITLE, PATH);
    };

    let inspector = SchemaInspector::new(store);
    let (listing, principals) = futures::join!(inspector.try_list_tables(), store.list_principals());

    let (tables, procedure_error) = match listing {
        Ok(tables) => (tables, None),
        Err(e) => {
            warn!("{}() unavailable: {}", LIST_TABLES_PROCEDURE, e);
            (Vec::new(), Some(e))
        }
    };
    let procedure_installed = procedure_error.is_none();
    let missing = missing_from(EXPECTED_TABLES, &tables);

    let auth_users = match &principals {
        Ok(list) => list.len().to_string(),
        Err(e) => format!("unavailable ({})", e),
    };

    let procedure_status = if procedure_installed {
        format!("<span class=\"ok\">✓ {}() exists</span>", LIST_TABLES_PROCEDURE)
    } else {
        format!("<span class=\"bad\">✗ {}() not found</span>", LIST_TABLES_PROCEDURE)
    };

    let mut body = format!(
        "<div class=\"card\"><h2>Project</h2><dl>\
<dt>Project Reference</dt><dd class=\"mono\">{}</dd>\
<dt>Auth Users Count</dt><dd>{}</dd>\
<dt>RPC Function Status</dt><dd>{}</dd></dl></div>",
        escape(&state.config.project_ref()),
        escape(&auth_users),
        procedure_status
    );

    if let Some(e) = &procedure_error {
        body.push_str(&components::panel(
            components::Tone::Info,
            "Setup Required",
            &format!(
                "<p>The table-listing function is not installed ({}). Run this SQL in the project's SQL editor:</p>\
<pre class=\"mono\">{}</pre>",
                escape(&e.to_string()),
                escape(LIST_TABLES_INSTALL_SQL)
            ),
        ));
    }

    let checklist: String = EXPECTED_TABLES
        .iter()
        .map(|table| {
            let (class, mark) = if tables.iter().any(|t| t == table) { ("ok", "✓") } else { ("bad", "✗") };
            format!("<li><span class=\"{}\">{}</span> <span class=\"mono\">{}</span></li>", class, mark, table)
        })
        .collect();
    body.push_str(&format!("<div class=\"card\"><h2>Expected Tables</h2><ul>{}</ul></div>", checklist));

    let all_tables = if tables.is_empty() {
        let hint = if procedure_installed { "" } else { " Install the RPC function first." };
        format!("<p>No tables found.{}</p>", hint)
    } else {
        let items: String = tables
            .iter()
            .map(|t| format!("<li class=\"mono\">{}</li>", escape(t)))
            .collect();
        format!("<ul>{}</ul>", items)
    };
    body.push_str(&format!(
        "<div class=\"card\"><h2>All Tables in Schema ({})</h2>{}</div>",
        tables.len(),
        all_tables
    ));

    // Without the procedure every table reads as missing, which says nothing.
    if procedure_installed && !missing.is_empty() {
        let items: String = missing
            .iter()
            .map(|t| format!("<li class=\"mono\">{}</li>", escape(t)))
            .collect();
        body.push_str(&components::panel(
            components::Tone::Warning,
            "Missing Tables",
            &format!(
                "<p>The following expected tables are missing from the schema:</p><ul>{}</ul>\
<p>This may mean the keys point at the wrong project. Expected: the main Cloud Aggregator project, \
not the admin panel project.</p>",
                items
            ),
        ));
    }

    page(StatusCode::OK, &principal, TITLE, PATH, &body)
}
