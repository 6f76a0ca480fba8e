use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print `data` as JSON, or run `text` to print it for humans.
pub fn output<T, F>(output_format: &OutputFormat, data: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(),
{
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "data": data,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => text(),
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, details: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });
            if let Some(details) = details {
                response["details"] = details;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Left-aligned two-column listing.
pub fn print_pairs(pairs: &[(String, String)]) {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in pairs {
        println!("{:width$}  {}", key, value, width = width);
    }
}
