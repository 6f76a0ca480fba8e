use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub reports: ReportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Endpoints and keys for the hosted store.
///
/// The server pair (`url` + `service_role_key`) backs every report query and
/// must point at the main Cloud Aggregator project. The public pair
/// (`public_url` + `anon_key`) only handles staff sessions.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub service_role_key: Option<String>,
    pub public_url: Option<String>,
    #[serde(skip_serializing)]
    pub anon_key: Option<String>,
    pub schema: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_secure: bool,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub listing_limit: u32,
    pub principal_page_size: u32,
}

// Keys never show up in logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_role_key", &self.service_role_key.as_ref().map(|_| "<redacted>"))
            .field("public_url", &self.public_url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values are
    /// treated exactly like missing ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(get)
    }

    fn with_overrides<F>(mut self, get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = get("ADMIN_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("ADMIN_PORT").or_else(|| get("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Store overrides
        self.store.url = get("ADMIN_SUPABASE_URL");
        self.store.service_role_key = get("ADMIN_SUPABASE_SERVICE_ROLE_KEY");
        self.store.public_url = get("ADMIN_SUPABASE_PUBLIC_URL");
        self.store.anon_key = get("ADMIN_SUPABASE_ANON_KEY");
        if let Some(v) = get("ADMIN_SUPABASE_SCHEMA") {
            self.store.schema = v;
        }
        if let Some(v) = get("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }

        // Session overrides
        if let Some(v) = get("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }
        if let Some(v) = get("SESSION_MAX_AGE_SECS") {
            self.session.max_age_secs = v.parse().unwrap_or(self.session.max_age_secs);
        }

        // Report overrides
        if let Some(v) = get("REPORT_LISTING_LIMIT") {
            self.reports.listing_limit = v.parse().unwrap_or(self.reports.listing_limit);
        }
        if let Some(v) = get("REPORT_PRINCIPAL_PAGE_SIZE") {
            self.reports.principal_page_size = v.parse().unwrap_or(self.reports.principal_page_size);
        }

        self
    }

    /// True when the server-side pair is present. Report pages refuse to
    /// query anything otherwise.
    pub fn is_configured(&self) -> bool {
        self.store.server_pair().is_some()
    }

    /// Project reference (the first label of the store hostname), safe to
    /// display without exposing the full URL.
    pub fn project_ref(&self) -> String {
        self.store
            .url
            .as_deref()
            .and_then(|raw| url::Url::parse(raw).ok())
            .and_then(|url| url.host_str().map(str::to_string))
            .and_then(|host| host.split('.').next().map(str::to_string))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| "not-configured".to_string())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            store: StoreConfig::defaults(30),
            session: SessionConfig {
                cookie_secure: false,
                max_age_secs: 60 * 60 * 24 * 7, // 1 week
            },
            reports: ReportConfig {
                listing_limit: 100,
                principal_page_size: 50,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            store: StoreConfig::defaults(15),
            session: SessionConfig {
                cookie_secure: true,
                max_age_secs: 60 * 60 * 24,
            },
            reports: ReportConfig {
                listing_limit: 100,
                principal_page_size: 100,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            store: StoreConfig::defaults(10),
            session: SessionConfig {
                cookie_secure: true,
                max_age_secs: 60 * 60 * 8,
            },
            reports: ReportConfig {
                listing_limit: 100,
                principal_page_size: 100,
            },
        }
    }
}

impl StoreConfig {
    fn defaults(timeout_secs: u64) -> Self {
        Self {
            url: None,
            service_role_key: None,
            public_url: None,
            anon_key: None,
            schema: "public".to_string(),
            timeout_secs,
        }
    }

    /// `(url, service_role_key)` when both are set.
    pub fn server_pair(&self) -> Option<(&str, &str)> {
        Some((self.url.as_deref()?, self.service_role_key.as_deref()?))
    }

    /// `(url, anon_key)` when both are set.
    pub fn public_pair(&self) -> Option<(&str, &str)> {
        Some((self.public_url.as_deref()?, self.anon_key.as_deref()?))
    }
}
