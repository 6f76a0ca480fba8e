use super::escape;
use crate::error::AdminError;
use crate::schema::LIST_TABLES_PROCEDURE;
use crate::store::ErrorPayload;

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Error,
    Warning,
    Info,
}

impl Tone {
    fn class(&self) -> &'static str {
        match self {
            Tone::Error => "error",
            Tone::Warning => "warning",
            Tone::Info => "info",
        }
    }
}

/// Coloured panel. `body_html` is inserted as-is.
pub fn panel(tone: Tone, title: &str, body_html: &str) -> String {
    format!(
        "<div class=\"panel {}\"><strong>{}</strong>{}</div>",
        tone.class(),
        escape(title),
        body_html
    )
}

/// Store failure with its full diagnostic payload.
pub fn error_panel(payload: &ErrorPayload) -> String {
    let details = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.message.clone());
    panel(
        Tone::Error,
        &format!("Error: {}", payload.message),
        &format!("<pre class=\"mono\">{}</pre>", escape(&details)),
    )
}

pub fn configuration_error(missing: &[&str]) -> String {
    let items: String = missing
        .iter()
        .map(|name| format!("<li class=\"mono\">{}</li>", escape(name)))
        .collect();
    panel(
        Tone::Error,
        "Configuration Error",
        &format!(
            "<p>Admin panel is not properly configured. Missing environment variables:</p>\
<ul>{}</ul><p>Check your .env file and ensure these variables point to the main \
Cloud Aggregator project.</p>",
            items
        ),
    )
}

/// Guidance for a page whose table is not in the live schema.
pub fn table_missing(table: &str, introspection_available: bool) -> String {
    let hint = if introspection_available {
        "Run the SQL migration that creates it, then reload this page.".to_string()
    } else {
        format!(
            "The schema could not be listed because {}() is not installed. \
See the Debug page for the setup SQL.",
            LIST_TABLES_PROCEDURE
        )
    };
    panel(
        Tone::Warning,
        "Not configured yet",
        &format!(
            "<p>The table <span class=\"mono\">{}</span> does not exist in the schema yet.</p><p>{}</p>",
            escape(table),
            escape(&hint)
        ),
    )
}

pub fn admin_error(err: &AdminError) -> String {
    match err {
        AdminError::Configuration { missing } => configuration_error(missing),
        AdminError::SchemaDrift { table, introspection_available } => table_missing(table, *introspection_available),
        AdminError::RemoteQuery(e) => error_panel(&e.payload()),
        AdminError::Authorization | AdminError::SessionMissing => {
            panel(Tone::Error, &err.to_string(), "<p><a href=\"/login\">Sign in</a></p>")
        }
    }
}

/// Table with escaped cells. An empty `rows` renders a single explanatory row.
pub fn data_table(headers: &[&str], rows: &[Vec<String>], empty_message: &str) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();

    let body = if rows.is_empty() {
        format!(
            "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>",
            headers.len().max(1),
            escape(empty_message)
        )
    } else {
        rows.iter()
            .map(|row| {
                let cells: String = row.iter().map(|c| format!("<td>{}</td>", escape(c))).collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect()
    };

    format!(
        "<div class=\"card\" style=\"padding:0\"><table><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>",
        head, body
    )
}

pub fn metric_cards(metrics: &[(&str, u64)]) -> String {
    let cards: String = metrics
        .iter()
        .map(|(label, value)| {
            format!(
                "<dl class=\"card metric\"><dt>{}</dt><dd>{}</dd></dl>",
                escape(label),
                value
            )
        })
        .collect();
    format!("<div class=\"cards\">{}</div>", cards)
}
