// handlers/protected/system.rs - GET /dashboard/system

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Response,
};

use super::{error_page, page};
use crate::auth::AdminPrincipal;
use crate::error::AdminError;
use crate::render::components;
use crate::reports::{fetch_metrics, fold_metrics, Metric};
use crate::state::AppState;

const TITLE: &str = "System";
const PATH: &str = "/dashboard/system";

/// GET /dashboard/system - the same counts as the overview, with a status
/// row per metric so missing tables and failures are visible individually.
pub async fn system_get(State(state): State<AppState>, Extension(principal): Extension<AdminPrincipal>) -> Response {
    let Some(store) = state.service.as_deref() else {
        return error_page(&AdminError::missing_server_config(&state.config), &principal, TITLE, PATH);
    };

    let summary = fold_metrics(fetch_metrics(store).await);

    let rows: Vec<Vec<String>> = Metric::ALL
        .iter()
        .map(|metric| {
            let status = match summary.failure(*metric) {
                None if summary.is_missing(*metric) => "Not configured yet (table missing)".to_string(),
                None => "OK".to_string(),
                Some(e) => {
                    let payload = e.payload();
                    match payload.code {
                        Some(code) => format!("Error {}: {}", code, payload.message),
                        None => format!("Error: {}", payload.message),
                    }
                }
            };
            vec![
                metric.table().to_string(),
                summary.total(*metric).to_string(),
                status,
            ]
        })
        .collect();

    let mut body = components::metric_cards(&summary.cards());
    body.push_str(&components::data_table(&["Table", "Rows", "Status"], &rows, "No metrics"));

    page(StatusCode::OK, &principal, TITLE, PATH, &body)
}
