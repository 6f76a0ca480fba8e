//! Report data behind the dashboard pages.
//!
//! Listing pages go through [`fetch_listing`], which enforces the
//! not-configured / table-missing / present sequence. Count pages go through
//! [`fetch_metrics`] and [`fold_metrics`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::render::format_date;
use crate::schema::SchemaInspector;
use crate::store::{Procedures, RemoteStore, SelectQuery, SortDirection, StoreError, TableQuery};

/// A row type that a listing page can render.
pub trait ReportRow: DeserializeOwned + Send {
    const TABLE: &'static str;
    /// Shown in the single table row when the listing is empty.
    const EMPTY_MESSAGE: &'static str;

    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

// Row ids are uuids in some tables and bigserials in others.
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn text(value: &Option<String>) -> String {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("—").to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ReportRow for UserRow {
    const TABLE: &'static str = "users";
    const EMPTY_MESSAGE: &'static str = "No users found";

    fn headers() -> &'static [&'static str] {
        &["Email", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        let email = self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("No email");
        vec![email.to_string(), format_date(self.created_at.as_deref())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRow {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ReportRow for CloudRow {
    const TABLE: &'static str = "clouds";
    const EMPTY_MESSAGE: &'static str = "No clouds found";

    fn headers() -> &'static [&'static str] {
        &["Name", "Provider", "Owner", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| self.id.clone()),
            text(&self.provider),
            text(&self.user_id),
            format_date(self.created_at.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRow {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ReportRow for SubscriptionRow {
    const TABLE: &'static str = "subscriptions";
    const EMPTY_MESSAGE: &'static str = "No subscriptions found";

    fn headers() -> &'static [&'static str] {
        &["Subscriber", "Plan", "Status", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            text(&self.user_id),
            text(&self.plan),
            text(&self.status),
            format_date(self.created_at.as_deref()),
        ]
    }
}

/// What a listing page has to show.
#[derive(Debug)]
pub enum Listing<T> {
    /// Server-side credentials absent; nothing was queried.
    NotConfigured,
    /// The table is not in the live schema; no row query was issued.
    /// `introspection_available` tells guidance apart for an absent
    /// listing procedure.
    TableMissing { table: &'static str, introspection_available: bool },
    Failed(StoreError),
    Rows(Vec<T>),
}

/// First page of `T::TABLE`, newest first.
pub async fn fetch_listing<T, S>(store: Option<&S>, limit: u32) -> Listing<T>
where
    T: ReportRow,
    S: RemoteStore + ?Sized,
{
    let Some(store) = store else {
        return Listing::NotConfigured;
    };

    // One listing answers both "does the table exist" and "is introspection
    // installed".
    let (exists, introspection_available) = match SchemaInspector::new(store).try_list_tables().await {
        Ok(tables) => (tables.iter().any(|t| t == T::TABLE), true),
        Err(e) => {
            warn!("Listing tables failed, treating '{}' as missing: {}", T::TABLE, e);
            (false, false)
        }
    };
    if !exists {
        info!("Table '{}' not in schema, showing setup guidance", T::TABLE);
        return Listing::TableMissing {
            table: T::TABLE,
            introspection_available,
        };
    }

    let query = SelectQuery::from(T::TABLE)
        .order_by("created_at", SortDirection::Desc)
        .limit(limit);

    match select_rows::<T, S>(store, &query).await {
        Ok(rows) => {
            debug!("Fetched {} rows from '{}'", rows.len(), T::TABLE);
            Listing::Rows(rows)
        }
        Err(e) => {
            error!("Listing '{}' failed: {}", T::TABLE, e);
            Listing::Failed(e)
        }
    }
}

async fn select_rows<T, S>(store: &S, query: &SelectQuery) -> Result<Vec<T>, StoreError>
where
    T: ReportRow,
    S: TableQuery + ?Sized,
{
    store
        .select(query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// Count-only metrics shown on the overview and system pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Users,
    Clouds,
    Subscriptions,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Users, Metric::Clouds, Metric::Subscriptions];

    pub fn table(&self) -> &'static str {
        match self {
            Metric::Users => "users",
            Metric::Clouds => "clouds",
            Metric::Subscriptions => "subscriptions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Users => "Total Users",
            Metric::Clouds => "Total Clouds",
            Metric::Subscriptions => "Total Subscriptions",
        }
    }
}

/// What happened to one metric.
#[derive(Debug)]
pub enum MetricOutcome {
    Counted(u64),
    /// Not in the live schema; no count was issued.
    TableMissing,
    Failed(StoreError),
}

/// Raw per-metric outcomes, in [`Metric::ALL`] order.
pub type MetricFetch = Vec<(Metric, MetricOutcome)>;

async fn count_metric<S>(store: &S, live: &[String], metric: Metric) -> MetricOutcome
where
    S: TableQuery + ?Sized,
{
    if !live.iter().any(|t| t == metric.table()) {
        return MetricOutcome::TableMissing;
    }
    match store.count(metric.table(), &[]).await {
        Ok(n) => MetricOutcome::Counted(n),
        Err(e) => MetricOutcome::Failed(e),
    }
}

/// List the schema once, then issue the counts for present tables
/// concurrently and wait for all of them.
pub async fn fetch_metrics<S>(store: &S) -> MetricFetch
where
    S: TableQuery + Procedures + ?Sized,
{
    let live = SchemaInspector::new(store).list_tables().await;

    let (users, clouds, subscriptions) = futures::join!(
        count_metric(store, &live, Metric::Users),
        count_metric(store, &live, Metric::Clouds),
        count_metric(store, &live, Metric::Subscriptions),
    );

    vec![
        (Metric::Users, users),
        (Metric::Clouds, clouds),
        (Metric::Subscriptions, subscriptions),
    ]
}

#[derive(Debug, Default)]
pub struct MetricsSummary {
    /// One entry per metric; missing and failed metrics count as 0.
    pub totals: Vec<(Metric, u64)>,
    pub missing: Vec<Metric>,
    pub failures: Vec<(Metric, StoreError)>,
}

impl MetricsSummary {
    pub fn total(&self, metric: Metric) -> u64 {
        self.totals
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn is_missing(&self, metric: Metric) -> bool {
        self.missing.contains(&metric)
    }

    pub fn failure(&self, metric: Metric) -> Option<&StoreError> {
        self.failures.iter().find(|(m, _)| *m == metric).map(|(_, e)| e)
    }

    pub fn cards(&self) -> Vec<(&'static str, u64)> {
        self.totals.iter().map(|(m, n)| (m.label(), *n)).collect()
    }
}

/// Fold per-metric outcomes. Missing and failing metrics default to 0 and are
/// recorded separately; the others keep their values.
pub fn fold_metrics(fetch: MetricFetch) -> MetricsSummary {
    let mut summary = MetricsSummary::default();
    for (metric, outcome) in fetch {
        match outcome {
            MetricOutcome::Counted(n) => summary.totals.push((metric, n)),
            MetricOutcome::TableMissing => {
                info!("Table '{}' not in schema, counting it as 0", metric.table());
                summary.totals.push((metric, 0));
                summary.missing.push(metric);
            }
            MetricOutcome::Failed(e) => {
                error!("Count of '{}' failed: {}", metric.table(), e);
                summary.totals.push((metric, 0));
                summary.failures.push((metric, e));
            }
        }
    }
    summary
}
