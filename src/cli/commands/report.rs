use serde_json::json;

use crate::cli::utils::{output, print_pairs};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::reports::{fetch_metrics, fold_metrics};
use crate::store::{RestStore, UserDirectory};

pub async fn counts(store: &RestStore, output_format: OutputFormat) -> anyhow::Result<()> {
    let summary = fold_metrics(fetch_metrics(store).await);

    let data: Vec<_> = summary
        .totals
        .iter()
        .map(|(metric, total)| {
            json!({
                "table": metric.table(),
                "count": total,
                "missing": summary.is_missing(*metric),
                "error": summary.failure(*metric).map(|e| e.payload()),
            })
        })
        .collect();

    output(&output_format, &data, || {
        let pairs: Vec<(String, String)> = summary
            .totals
            .iter()
            .map(|(metric, total)| {
                let value = match summary.failure(*metric) {
                    Some(e) => format!("{} (error: {})", total, e),
                    None if summary.is_missing(*metric) => format!("{} (table missing)", total),
                    None => total.to_string(),
                };
                (metric.label().to_string(), value)
            })
            .collect();
        print_pairs(&pairs);
    })
}

pub async fn principals(store: &RestStore, output_format: OutputFormat) -> anyhow::Result<()> {
    let principals = store.list_principals().await?;

    output(&output_format, &principals, || {
        let pairs: Vec<(String, String)> = principals
            .iter()
            .map(|p| {
                let created = p.created_at.map(|c| c.date_naive().to_string()).unwrap_or_default();
                (p.display_email().to_string(), created)
            })
            .collect();
        print_pairs(&pairs);
        println!("{} principal(s)", principals.len());
    })
}

pub fn show_config(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    output(&output_format, config, || {
        print_pairs(&[
            ("environment".to_string(), format!("{:?}", config.environment)),
            ("project".to_string(), config.project_ref()),
            ("configured".to_string(), config.is_configured().to_string()),
            ("identity".to_string(), config.store.public_pair().is_some().to_string()),
            ("schema".to_string(), config.store.schema.clone()),
            ("bind".to_string(), config.bind_addr()),
        ]);
    })
}
