use super::escape;

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#f9fafb;color:#111827}\
.shell{display:flex;min-height:100vh}\
aside{width:16rem;background:#fff;border-right:1px solid #e5e7eb}\
aside h2{padding:1.5rem;margin:0;font-size:1.25rem}\
aside .who{padding:0 1.5rem 1rem;font-size:.75rem;color:#6b7280}\
nav a{display:block;margin:0 1rem;padding:.5rem 1rem;border-radius:.375rem;color:#374151;text-decoration:none;font-size:.875rem}\
nav a:hover,nav a.active{background:#f3f4f6}\
nav a.logout{color:#dc2626}\
main{flex:1;padding:2rem}\
h1{font-size:1.875rem;margin:0 0 1.5rem}\
.panel{border-radius:.375rem;padding:1rem;margin:1rem 0;font-size:.875rem}\
.panel.error{background:#fef2f2;color:#991b1b}\
.panel.warning{background:#fefce8;color:#854d0e}\
.panel.info{background:#eff6ff;color:#1e40af}\
.panel pre{white-space:pre-wrap;font-size:.75rem}\
.card{background:#fff;border-radius:.5rem;box-shadow:0 1px 2px rgba(0,0,0,.08);padding:1.5rem;margin-bottom:1.5rem}\
.cards{display:grid;grid-template-columns:repeat(3,1fr);gap:1.5rem}\
.metric dt{font-size:.875rem;color:#6b7280}.metric dd{margin:.5rem 0 0;font-size:1.875rem;font-weight:600}\
table{width:100%;border-collapse:collapse;background:#fff}\
th{background:#f9fafb;text-align:left;font-size:.75rem;text-transform:uppercase;color:#6b7280;padding:.75rem 1.5rem}\
td{padding:1rem 1.5rem;border-top:1px solid #e5e7eb;font-size:.875rem}\
td.empty{text-align:center;color:#6b7280}\
.ok{color:#16a34a}.bad{color:#dc2626}.mono{font-family:ui-monospace,monospace}\
.login{max-width:28rem;margin:4rem auto;background:#fff;padding:2rem;border-radius:.5rem;box-shadow:0 1px 2px rgba(0,0,0,.08)}\
.login label{display:block;font-size:.875rem;margin-top:1rem}\
.login input{width:100%;box-sizing:border-box;padding:.5rem .75rem;margin-top:.25rem;border:1px solid #d1d5db;border-radius:.375rem}\
.login .actions{display:flex;gap:1rem;margin-top:1.5rem}\
.login button{flex:1;padding:.5rem 1rem;border-radius:.375rem;border:1px solid #d1d5db;background:#fff;cursor:pointer}\
.login button.primary{background:#2563eb;color:#fff;border-color:#2563eb}";

/// Sidebar entries: (path, label).
pub const NAV: &[(&str, &str)] = &[
    ("/dashboard", "Overview"),
    ("/dashboard/users", "Users"),
    ("/dashboard/clouds", "Clouds"),
    ("/dashboard/billing", "Billing"),
    ("/dashboard/system", "System"),
    ("/dashboard/debug", "Debug"),
];

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape(title),
        STYLE,
        body
    )
}

/// Standalone page without navigation (login, configuration errors).
pub fn bare_page(title: &str, body: &str) -> String {
    document(title, body)
}

/// Dashboard page with the sidebar. `active` is the current path.
pub fn dashboard_page(title: &str, active: &str, principal_email: &str, body: &str) -> String {
    let links: String = NAV
        .iter()
        .map(|(path, label)| {
            let class = if *path == active { " class=\"active\"" } else { "" };
            format!("<a href=\"{}\"{}>{}</a>", path, class, label)
        })
        .collect();

    document(
        &format!("{} · Admin Panel", title),
        &format!(
            "<div class=\"shell\"><aside><h2>Admin Panel</h2>\
<div class=\"who\">{}</div><nav>{}<a class=\"logout\" href=\"/logout\">Logout</a></nav></aside>\
<main><h1>{}</h1>{}</main></div>",
            escape(principal_email),
            links,
            escape(title),
            body
        ),
    )
}
