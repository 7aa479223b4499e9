//! Environment-driven configuration.
//!
//! Every toggle is read exactly once at startup and resolved into an explicit
//! mode value. Binaries build their collaborators from these modes and never
//! look at the environment again.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_ORDER_NOTIONAL: f64 = 100.0;
pub const DEFAULT_ACCOUNT_ID: &str = "default_account";
pub const DEFAULT_TRADING_ENDPOINT: &str = "https://paper-api.alpaca.markets/v2";
pub const DEFAULT_DATA_ENDPOINT: &str = "https://data.alpaca.markets/v2";
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_DB_TOKEN_RESOURCE: &str = "https://ossrdbms-aad.database.windows.net";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("CRITICAL: broker credentials missing ({0} is not set)")]
    MissingCredentials(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Key/value source the configs are parsed from.
pub struct EnvSource {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvSource {
    /// Reads the process environment. Blank values count as unset.
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key: &str| env::var(key).ok()),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            lookup: Box::new(move |key: &str| map.get(key).cloned()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: key,
                value: raw,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DbAuth {
    /// `DB_PASSWORD` present: plain credential login.
    Password { username: String, password: String },
    /// No password: bearer token from the managed identity endpoint.
    ManagedIdentity { username: String, resource: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub auth: DbAuth,
    pub bootstrap_schema: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMode {
    Real(DbConfig),
    Mocked,
}

impl StoreMode {
    pub fn from_env(env: &EnvSource) -> Result<Self, ConfigError> {
        if env.flag("MOCK_MODE") {
            return Ok(Self::Mocked);
        }

        let username = env.get_or("DB_USERNAME", "postgres");
        let auth = match env.get("DB_PASSWORD") {
            Some(password) => DbAuth::Password { username, password },
            None => DbAuth::ManagedIdentity {
                username,
                resource: env.get_or("DB_TOKEN_RESOURCE", DEFAULT_DB_TOKEN_RESOURCE),
            },
        };

        Ok(Self::Real(DbConfig {
            host: env.get_or("DB_HOST", "localhost"),
            port: env.parse_or("DB_PORT", 5432)?,
            database: env.get_or("DB_NAME", "stockdb"),
            auth,
            bootstrap_schema: env.flag("DB_BOOTSTRAP_SCHEMA"),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlobTarget {
    pub account: Option<String>,
    pub container: String,
    pub sas_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportMode {
    Local { dir: PathBuf },
    Cloud(BlobTarget),
}

impl ReportMode {
    pub fn from_env(env: &EnvSource) -> Self {
        if env.flag("LOCAL_MODE") {
            Self::Local {
                dir: PathBuf::from(env.get_or("REPORT_DIR", "signals")),
            }
        } else {
            Self::Cloud(BlobTarget {
                account: env.get("STORAGE_ACCOUNT"),
                container: env.get_or("CONTAINER_NAME", "daily-analysis"),
                sas_token: env.get("STORAGE_SAS_TOKEN"),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotifierConfig {
    Webhook(String),
    Telegram { token: String, chat_id: i64 },
    Disabled,
}

impl NotifierConfig {
    pub fn from_env(env: &EnvSource) -> Result<Self, ConfigError> {
        if let (Some(token), Some(chat)) = (env.get("TELEGRAM_BOT_TOKEN"), env.get("TELEGRAM_CHAT_ID")) {
            let chat_id = chat.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
                name: "TELEGRAM_CHAT_ID",
                value: chat.clone(),
            })?;
            return Ok(Self::Telegram { token, chat_id });
        }
        Ok(env
            .get("WEBHOOK_URL")
            .map(Self::Webhook)
            .unwrap_or(Self::Disabled))
    }
}

#[derive(Clone, PartialEq)]
pub struct BrokerCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("api_key", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

impl BrokerCredentials {
    pub fn from_env(env: &EnvSource) -> Result<Self, ConfigError> {
        let api_key = env
            .get("ALPACA_API_KEY")
            .ok_or(ConfigError::MissingCredentials("ALPACA_API_KEY"))?;
        let secret_key = env
            .get("ALPACA_SECRET_KEY")
            .ok_or(ConfigError::MissingCredentials("ALPACA_SECRET_KEY"))?;
        Ok(Self { api_key, secret_key })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingMode {
    Live,
    Simulated,
}

impl TradingMode {
    pub fn from_env(env: &EnvSource) -> Self {
        if env.flag("SIMULATION_MODE") {
            Self::Simulated
        } else {
            Self::Live
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub store: StoreMode,
    pub report: ReportMode,
    pub notifier: NotifierConfig,
    pub retention_days: u32,
    pub replace_todays_signals: bool,
    pub chart_url: String,
}

impl GeneratorConfig {
    pub fn from_env(env: &EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            store: StoreMode::from_env(env)?,
            report: ReportMode::from_env(env),
            notifier: NotifierConfig::from_env(env)?,
            retention_days: env.parse_or("SIGNAL_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?,
            replace_todays_signals: env.flag("REPLACE_TODAYS_SIGNALS"),
            chart_url: env.get_or("YAHOO_CHART_URL", DEFAULT_CHART_URL),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub credentials: BrokerCredentials,
    pub store: StoreMode,
    pub trading: TradingMode,
    pub notifier: NotifierConfig,
    pub account_id: String,
    pub trading_endpoint: String,
    pub data_endpoint: String,
    pub order_notional: f64,
}

impl ExecutorConfig {
    /// Credentials are resolved first so that a run without them stops
    /// before anything else is read.
    pub fn from_env(env: &EnvSource) -> Result<Self, ConfigError> {
        let credentials = BrokerCredentials::from_env(env)?;
        let order_notional: f64 = env.parse_or("ORDER_NOTIONAL", DEFAULT_ORDER_NOTIONAL)?;
        if !order_notional.is_finite() || order_notional <= 0.0 {
            return Err(ConfigError::Invalid {
                name: "ORDER_NOTIONAL",
                value: order_notional.to_string(),
            });
        }

        Ok(Self {
            credentials,
            store: StoreMode::from_env(env)?,
            trading: TradingMode::from_env(env),
            notifier: NotifierConfig::from_env(env)?,
            account_id: env.get_or("ACCOUNT_ID", DEFAULT_ACCOUNT_ID),
            trading_endpoint: env.get_or("ALPACA_ENDPOINT", DEFAULT_TRADING_ENDPOINT),
            data_endpoint: env.get_or("ALPACA_DATA_ENDPOINT", DEFAULT_DATA_ENDPOINT),
            order_notional,
        })
    }
}
