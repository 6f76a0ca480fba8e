use serde_json::json;

use crate::cli::utils::{output, output_error};
use crate::cli::OutputFormat;
use crate::schema::{missing_from, SchemaInspector, EXPECTED_TABLES, LIST_TABLES_INSTALL_SQL, LIST_TABLES_PROCEDURE};
use crate::store::RestStore;

pub async fn tables(store: &RestStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match SchemaInspector::new(store).try_list_tables().await {
        Ok(tables) => output(&output_format, &json!({ "tables": tables }), || {
            if tables.is_empty() {
                println!("No tables found.");
            }
            for table in &tables {
                println!("{}", table);
            }
        }),
        Err(e) => {
            output_error(
                &output_format,
                &format!("{}() failed: {}", LIST_TABLES_PROCEDURE, e),
                Some(json!(e.payload())),
            )?;
            anyhow::bail!("table listing unavailable")
        }
    }
}

pub async fn drift(store: &RestStore, install_sql: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    if install_sql {
        println!("{}", LIST_TABLES_INSTALL_SQL);
        return Ok(());
    }

    let listing = SchemaInspector::new(store).try_list_tables().await;
    let procedure_installed = listing.is_ok();
    let tables = listing.unwrap_or_default();
    let missing = missing_from(EXPECTED_TABLES, &tables);

    let data = json!({
        "procedure_installed": procedure_installed,
        "expected": EXPECTED_TABLES,
        "missing": missing,
    });
    output(&output_format, &data, || {
        if !procedure_installed {
            println!("✗ {}() not found; run `cloud-admin-cli drift --install-sql` for the setup SQL", LIST_TABLES_PROCEDURE);
        }
        for table in EXPECTED_TABLES {
            let mark = if missing.iter().any(|m| m == table) { "✗" } else { "✓" };
            println!("{} {}", mark, table);
        }
    })
}
