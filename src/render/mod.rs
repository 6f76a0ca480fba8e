//! Server-side HTML for the dashboard. Pages are small enough that plain
//! string building covers them; every dynamic value goes through [`escape`].

pub mod components;
pub mod layout;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Calendar date of a store timestamp. Accepts RFC 3339 (`timestamptz`),
/// naive timestamps and bare dates; anything else is shown as-is.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "—".to_string();
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.date_naive().to_string();
    }
    // PostgREST renders timestamptz with a `+00:00` offset but without the `T`
    // in some configurations.
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return ts.date_naive().to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.date().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn formats_store_timestamps() {
        assert_eq!(format_date(Some("2024-03-01T10:00:00.123456+00:00")), "2024-03-01");
        assert_eq!(format_date(Some("2024-03-01T10:00:00Z")), "2024-03-01");
        assert_eq!(format_date(Some("2024-03-01T10:00:00.5")), "2024-03-01");
        assert_eq!(format_date(Some("2024-03-01")), "2024-03-01");
        assert_eq!(format_date(Some("yesterday")), "yesterday");
        assert_eq!(format_date(None), "—");
        assert_eq!(format_date(Some("  ")), "—");
    }
}
