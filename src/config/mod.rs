//! Configuration loading and management
//!
//! Configuration is read from YAML, then selectively overridden from the
//! environment so that deployments can keep secrets out of the file.
//!
//! ```yaml
//! server:
//!   bind_addr: "0.0.0.0:3000"
//!   cors_origin: "http://localhost:3000"
//! database:
//!   host: localhost
//!   name: knust_enterprise_hub
//! listing:
//!   default_limit: 10
//!   max_limit: 100
//!   detail_review_limit: 20
//! analytics:
//!   top_products: 5
//!   window_days: 30
//! ```

use crate::core::analytics::AnalyticsWindow;
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_addr: String,

    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,

    /// Ignore caller identity, so every write is rejected with 401
    pub read_only: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            cors_origin: None,
            read_only: false,
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "knust_enterprise_hub".to_string(),
            max_connections: 10,
        }
    }
}

#[cfg(feature = "postgres")]
impl DatabaseConfig {
    /// Connection options; `url` wins over the individual fields
    ///
    /// Built field by field, so credentials never need URL escaping.
    pub fn connect_options(&self) -> Result<sqlx::postgres::PgConnectOptions> {
        use sqlx::postgres::PgConnectOptions;

        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .map_err(|e| anyhow!("Invalid DATABASE_URL: {}", e));
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        Ok(if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        })
    }
}

/// Listing and detail limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListingConfig {
    /// Page size when the request carries none
    pub default_limit: u64,

    /// Largest page size a request may ask for
    pub max_limit: u64,

    /// Number of recent reviews embedded in a business detail
    pub detail_review_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            detail_review_limit: 20,
        }
    }
}

/// Complete configuration for the hub
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub analytics: AnalyticsWindow,
}

impl HubConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables
    ///
    /// Recognized: `DATABASE_URL`, `DB_HOST`, `DB_PORT`, `DB_USER`,
    /// `DB_PASSWORD`, `DB_NAME`, `PORT`, `CORS_ORIGIN`.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable source
    pub fn with_vars<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = var("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = var("DB_PORT") {
            self.database.port = port
                .parse()
                .map_err(|_| anyhow!("DB_PORT must be a port number, got '{}'", port))?;
        }
        if let Some(user) = var("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = var("DB_NAME") {
            self.database.name = name;
        }
        if let Some(port) = var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| anyhow!("PORT must be a port number, got '{}'", port))?;
            let host = self
                .server
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.server.bind_addr = format!("{}:{}", host, port);
        }
        if let Some(origin) = var("CORS_ORIGIN") {
            self.server.cors_origin = Some(origin);
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values the directory cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.listing.default_limit == 0 || self.listing.max_limit == 0 {
            bail!("listing limits must be positive");
        }
        if self.listing.default_limit > self.listing.max_limit {
            bail!(
                "listing.default_limit ({}) exceeds listing.max_limit ({})",
                self.listing.default_limit,
                self.listing.max_limit
            );
        }
        if self.analytics.window_days == 0 {
            bail!("analytics.window_days must be positive");
        }
        Ok(())
    }
}
