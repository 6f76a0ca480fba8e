pub mod commands;
pub mod utils;

use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AdminError;
use crate::store::RestStore;

#[derive(Parser)]
#[command(name = "cloud-admin-cli")]
#[command(about = "Cloud Admin CLI - schema diagnostics and report counts from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List tables in the configured schema")]
    Tables,

    #[command(about = "Show expected tables missing from the live schema")]
    Drift {
        #[arg(long, help = "Print the SQL that installs the table-listing function")]
        install_sql: bool,
    },

    #[command(about = "Row counts for users, clouds and subscriptions")]
    Counts,

    #[command(about = "List principals in the user directory")]
    Principals,

    #[command(about = "Show the resolved configuration (keys redacted)")]
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Tables => commands::schema::tables(&connect(&config)?, output_format).await,
        Commands::Drift { install_sql } => {
            commands::schema::drift(&connect(&config)?, install_sql, output_format).await
        }
        Commands::Counts => commands::report::counts(&connect(&config)?, output_format).await,
        Commands::Principals => commands::report::principals(&connect(&config)?, output_format).await,
        Commands::Config => commands::report::show_config(&config, output_format),
    }
}

/// Privileged client for the configured project, or the same configuration
/// error the dashboard shows.
fn connect(config: &AppConfig) -> anyhow::Result<RestStore> {
    let Some((url, key)) = config.store.server_pair() else {
        bail!(AdminError::missing_server_config(config));
    };
    let store = RestStore::new(url, key, &config.store.schema, Duration::from_secs(config.store.timeout_secs))?
        .with_principal_page_size(config.reports.principal_page_size);
    Ok(store)
}
