use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: Option<AuthConfig>,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }

    pub fn database(&self) -> Result<&DatabaseConfig> {
        self.database
            .as_ref()
            .context("database config missing; set APP_DATABASE__URL")
    }

    pub fn auth(&self) -> Result<&AuthConfig> {
        self.auth
            .as_ref()
            .context("auth config missing; set APP_AUTH__JWT_SECRET, APP_AUTH__ADMIN_EMAIL and APP_AUTH__ADMIN_PASSWORD")
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

/// Business knobs of the shop itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub low_stock_threshold: i32,
    pub default_page_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: defaults::DEFAULT_LOW_STOCK_THRESHOLD as i32,
            default_page_size: defaults::DEFAULT_PAGE_SIZE as u64,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}

fn default_access_ttl_secs() -> i64 {
    defaults::DEFAULT_ACCESS_TTL_SECS
}

fn default_refresh_ttl_days() -> i64 {
    defaults::DEFAULT_REFRESH_TTL_DAYS
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::config::EnvConfig;

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = AppConfig::from_vars(Vec::<(String, String)>::new()).expect("defaults load");
        assert_eq!(cfg.general.port, 3000);
        assert_eq!(cfg.store.default_page_size, 20);
        assert_eq!(cfg.store.low_stock_threshold, 5);
        assert!(cfg.database.is_none());
        assert!(cfg.auth().is_err());
    }

    #[test]
    fn nested_sections_are_read_from_prefixed_variables() {
        let cfg = AppConfig::from_vars([
            ("APP_GENERAL__PORT", "8080"),
            ("APP_DATABASE__URL", "sqlite://store.db?mode=rwc"),
            ("APP_AUTH__JWT_SECRET", "super-secret"),
            ("APP_AUTH__ADMIN_EMAIL", "admin@example.com"),
            ("APP_AUTH__ADMIN_PASSWORD", "adminpassword"),
            ("APP_STORE__LOW_STOCK_THRESHOLD", "3"),
        ])
        .expect("config should load");

        assert_eq!(cfg.general.port, 8080);
        let database = cfg.database().expect("database section");
        assert_eq!(database.max_connections, 10);
        let auth = cfg.auth().expect("auth section");
        assert_eq!(auth.access_ttl_secs, 3600);
        assert_eq!(auth.refresh_ttl_days, 30);
        assert_eq!(cfg.store.low_stock_threshold, 3);
    }

    #[test]
    fn invalid_values_are_reported_together() {
        let err = AppConfig::from_vars([
            ("APP_AUTH__JWT_SECRET", " "),
            ("APP_AUTH__ADMIN_EMAIL", "admin@example.com"),
            ("APP_AUTH__ADMIN_PASSWORD", "short"),
        ])
        .expect_err("config should be rejected");
        let message = err.to_string();
        assert!(message.contains("auth.jwt_secret"));
        assert!(message.contains("auth.admin_password"));
    }
}
