//! API server configuration.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! ```text
//! built-in defaults  →  webpos.toml (optional, or $WEBPOS_CONFIG)  →  WEBPOS_* env vars
//! ```
//!
//! The raw layer is then resolved against the profile. `production` refuses
//! to start without a real signing secret and admin password; `development`
//! falls back to well-known values and warns.

use std::fmt;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use tracing::warn;
use webpos_core::{StockPolicy, TotalsPolicy};

/// Development-only signing secret. Refused in production.
pub const DEV_SIGNING_SECRET: &str = "change_this_secret";

/// Development-only bootstrap admin password. Refused in production.
pub const DEV_ADMIN_PASSWORD: &str = "123456";

/// Minimum signing secret length accepted in production (bytes).
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_CONFIG_FILE: &str = "webpos";

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration as read from file and environment, before profile rules.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub profile: Profile,
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub signing_secret: Option<String>,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub allow_backorder: bool,
    pub totals_policy: TotalsPolicy,
    pub log_format: LogFormat,
    pub cors_permissive: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            profile: Profile::Development,
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_path: PathBuf::from("webpos.db"),
            max_connections: 5,
            signing_secret: None,
            admin_username: "admin".to_string(),
            admin_password: None,
            allow_backorder: false,
            totals_policy: TotalsPolicy::Enforce,
            log_format: LogFormat::Pretty,
            cors_permissive: true,
        }
    }
}

impl RawConfig {
    /// Loads the optional config file and `WEBPOS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("WEBPOS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(&file).required(false))
                .add_source(Environment::with_prefix("WEBPOS").try_parsing(true)),
        )
    }

    /// Builds from explicit sources; missing keys keep their defaults.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Applies the profile rules.
    pub fn resolve(self) -> Result<ApiConfig, ConfigError> {
        if self.admin_username.trim().is_empty() {
            return Err(ConfigError::InvalidValue("admin_username".to_string()));
        }

        let signing_secret = match (self.profile, self.signing_secret) {
            (Profile::Production, None) => {
                return Err(ConfigError::MissingRequired("signing_secret".to_string()));
            }
            (Profile::Production, Some(secret)) if secret == DEV_SIGNING_SECRET => {
                return Err(ConfigError::Insecure {
                    key: "signing_secret".to_string(),
                    reason: "the development default is not allowed in production".to_string(),
                });
            }
            (Profile::Production, Some(secret)) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::Insecure {
                    key: "signing_secret".to_string(),
                    reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
                });
            }
            (Profile::Production, Some(secret)) => secret,
            (Profile::Development, Some(secret)) if !secret.is_empty() => secret,
            (Profile::Development, _) => {
                warn!("signing_secret not set, using the development default; tokens are forgeable");
                DEV_SIGNING_SECRET.to_string()
            }
        };

        let admin_password = match (self.profile, self.admin_password) {
            (Profile::Production, None) => {
                return Err(ConfigError::MissingRequired("admin_password".to_string()));
            }
            (Profile::Production, Some(password)) if password == DEV_ADMIN_PASSWORD || password.is_empty() => {
                return Err(ConfigError::Insecure {
                    key: "admin_password".to_string(),
                    reason: "the development default is not allowed in production".to_string(),
                });
            }
            (Profile::Production, Some(password)) => password,
            (Profile::Development, Some(password)) if !password.is_empty() => password,
            (Profile::Development, _) => {
                warn!("admin_password not set, using the development default");
                DEV_ADMIN_PASSWORD.to_string()
            }
        };

        Ok(ApiConfig {
            profile: self.profile,
            host: self.host,
            port: self.port,
            database_path: self.database_path,
            max_connections: self.max_connections,
            signing_secret,
            admin_username: self.admin_username,
            admin_password,
            stock_policy: StockPolicy::from_allow_backorder(self.allow_backorder),
            totals_policy: self.totals_policy,
            log_format: self.log_format,
            cors_permissive: self.cors_permissive,
        })
    }
}

impl fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawConfig")
            .field("profile", &self.profile)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "<redacted>"))
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("allow_backorder", &self.allow_backorder)
            .field("totals_policy", &self.totals_policy)
            .finish_non_exhaustive()
    }
}

/// Resolved, validated configuration.
#[derive(Clone)]
pub struct ApiConfig {
    pub profile: Profile,
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub signing_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub stock_policy: StockPolicy,
    pub totals_policy: TotalsPolicy,
    pub log_format: LogFormat,
    pub cors_permissive: bool,
}

impl ApiConfig {
    /// Address to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("profile", &self.profile)
            .field("bind", &self.bind_addr())
            .field("database_path", &self.database_path)
            .field("max_connections", &self.max_connections)
            .field("signing_secret", &"<redacted>")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("stock_policy", &self.stock_policy)
            .field("totals_policy", &self.totals_policy)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Insecure value for {key}: {reason}")]
    Insecure { key: String, reason: String },
}
