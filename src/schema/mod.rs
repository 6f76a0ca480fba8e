//! Schema introspection and configuration drift detection.
//!
//! Table listing is a diagnostic: when the listing procedure is missing or
//! fails, callers get an empty list and the dashboard keeps working in a
//! degraded mode. Nothing here is cached; every call asks the store again.

use serde_json::Value;
use tracing::warn;

use crate::store::{Procedures, StoreError};

/// Tables the dashboard reads from, in display order.
pub const EXPECTED_TABLES: &[&str] = &["admin_users", "clouds", "subscriptions", "users"];

/// Server-side function that returns one `{ table_name }` row per table.
pub const LIST_TABLES_PROCEDURE: &str = "list_public_tables";

/// SQL an operator runs once to install [`LIST_TABLES_PROCEDURE`].
pub const LIST_TABLES_INSTALL_SQL: &str = "\
create or replace function public.list_public_tables()
returns table(table_name text)
language sql
security definer
as $$
  select tablename::text as table_name
  from pg_catalog.pg_tables
  where schemaname = 'public'
  order by tablename;
$$;

revoke all on function public.list_public_tables() from public;
grant execute on function public.list_public_tables() to anon, authenticated;";

pub struct SchemaInspector<'a, S: Procedures + ?Sized> {
    store: &'a S,
}

impl<'a, S: Procedures + ?Sized> SchemaInspector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Table names in the schema namespace, or empty on any failure.
    pub async fn list_tables(&self) -> Vec<String> {
        match self.try_list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                warn!("Listing tables via {}() failed, treating schema as empty: {}", LIST_TABLES_PROCEDURE, e);
                Vec::new()
            }
        }
    }

    /// Like [`list_tables`](Self::list_tables) but keeps the failure, for
    /// diagnostics that need to tell "no tables" from "cannot tell".
    pub async fn try_list_tables(&self) -> Result<Vec<String>, StoreError> {
        let body = self.store.invoke(LIST_TABLES_PROCEDURE).await?;
        table_names(body)
    }

    pub async fn table_exists(&self, table: &str) -> bool {
        self.list_tables().await.iter().any(|t| t == table)
    }

    /// Expected tables absent from the live schema, in [`EXPECTED_TABLES`] order.
    pub async fn missing_expected_tables(&self) -> Vec<String> {
        let live = self.list_tables().await;
        missing_from(EXPECTED_TABLES, &live)
    }

    /// Whether the listing procedure answers at all.
    pub async fn procedure_installed(&self) -> bool {
        self.store.invoke(LIST_TABLES_PROCEDURE).await.is_ok()
    }
}

/// `expected - live`, keeping the order of `expected`.
pub fn missing_from(expected: &[&str], live: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|name| !live.iter().any(|t| t == *name))
        .map(|name| name.to_string())
        .collect()
}

// Accepts rows of `{ "table_name": .. }` and, for hand-written procedures,
// plain string arrays.
fn table_names(body: Value) -> Result<Vec<String>, StoreError> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Null => return Ok(vec![]),
        other => {
            return Err(StoreError::Decode(format!(
                "{}() returned {} instead of rows",
                LIST_TABLES_PROCEDURE, other
            )))
        }
    };

    rows.into_iter()
        .map(|row| match row {
            Value::String(name) => Ok(name),
            Value::Object(mut fields) => match fields.remove("table_name") {
                Some(Value::String(name)) => Ok(name),
                _ => Err(StoreError::Decode("row without a table_name".to_string())),
            },
            other => Err(StoreError::Decode(format!("unexpected row {}", other))),
        })
        .collect()
}
