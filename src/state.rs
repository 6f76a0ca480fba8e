use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::store::{RemoteStore, RestStore, StoreError};

/// Shared handles for every request. Store clients are built once at
/// startup and passed in here, never reached through globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Privileged handle for report queries. `None` when the server-side pair
    /// is not configured.
    pub service: Option<Arc<dyn RemoteStore>>,
    /// Public-key handle for staff sessions and the allow-list check.
    pub identity: Option<Arc<dyn RemoteStore>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        service: Option<Arc<dyn RemoteStore>>,
        identity: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            service,
            identity,
        }
    }

    /// Build REST clients for whichever key pairs are configured.
    pub fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(config.store.timeout_secs);

        let service: Option<Arc<dyn RemoteStore>> = match config.store.server_pair() {
            Some((url, key)) => {
                let store = RestStore::new(url, key, &config.store.schema, timeout)?
                    .with_principal_page_size(config.reports.principal_page_size);
                info!("Report queries go to project '{}'", config.project_ref());
                Some(Arc::new(store))
            }
            None => {
                warn!("ADMIN_SUPABASE_URL / ADMIN_SUPABASE_SERVICE_ROLE_KEY not set; report pages will show a configuration error");
                None
            }
        };

        let identity: Option<Arc<dyn RemoteStore>> = match config.store.public_pair() {
            Some((url, key)) => Some(Arc::new(RestStore::new(url, key, &config.store.schema, timeout)?)),
            None => {
                warn!("ADMIN_SUPABASE_PUBLIC_URL / ADMIN_SUPABASE_ANON_KEY not set; sign-in is unavailable");
                None
            }
        };

        Ok(Self::new(config, service, identity))
    }
}
