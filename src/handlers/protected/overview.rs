// handlers/protected/overview.rs - GET /dashboard

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Response,
};

use super::{error_page, page};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::render::{components, escape};
use crate::reports::{fetch_metrics, fold_metrics};
use crate::state::AppState;

const TITLE: &str = "Overview";
const PATH: &str = "/dashboard";

/// GET /dashboard - headline counts. A missing table or failing count shows
/// as 0 with a panel naming it; the other counts are unaffected.
pub async fn overview_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let Some(store) = state.service.as_deref() else {
        return error_page(&AdminError::missing_server_config(&state.config), &principal, TITLE, PATH);
    };

    let summary = fold_metrics(fetch_metrics(store).await);

    let mut body = components::metric_cards(&summary.cards());
    if !summary.missing.is_empty() {
        let names: Vec<String> = summary
            .missing
            .iter()
            .map(|metric| format!("<span class=\"mono\">{}</span>", escape(metric.table())))
            .collect();
        body.push_str(&components::panel(
            components::Tone::Info,
            "Not configured yet",
            &format!(
                "<p>Not in the schema yet: {}. Run the SQL migration that creates them. \
The Debug page lists every missing table.</p>",
                names.join(", ")
            ),
        ));
    }
    if !summary.failures.is_empty() {
        let names: Vec<String> = summary
            .failures
            .iter()
            .map(|(metric, _)| format!("<span class=\"mono\">{}</span>", escape(metric.table())))
            .collect();
        body.push_str(&components::panel(
            components::Tone::Warning,
            "Some counts are unavailable",
            &format!(
                "<p>Shown as 0: {}. See the System page for details.</p>",
                names.join(", ")
            ),
        ));
    }

    page(StatusCode::OK, &principal, TITLE, PATH, &body)
}
