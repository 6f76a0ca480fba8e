use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cloud_admin::config::AppConfig;
use cloud_admin::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so ADMIN_SUPABASE_* can live next to the binary.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloud_admin=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!("Starting Cloud Admin in {:?} mode", config.environment);
    if !config.is_configured() {
        info!("Server-side store pair not set; report pages will show the configuration error");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config).context("failed to build store clients")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Cloud Admin listening on http://{}", bind_addr);

    axum::serve(listener, cloud_admin::app(state))
        .await
        .context("server error")?;
    Ok(())
}
