//! # Configuration Module
//!
//! This module defines the runtime configuration of the bot. All settings
//! come from environment variables (optionally loaded from a `.env` file),
//! the container starts the binary without arguments.

// Constants for database configuration
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECT_RETRIES: u32 = 5;
pub const DEFAULT_BASE_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 10_000;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Errors raised while reading configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required variable is not set or is blank
    Missing(&'static str),
    /// A variable is set but cannot be parsed
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => {
                write!(f, "{key} has an invalid value: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection pool and startup retry settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection attempts before startup gives up
    pub connect_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for acquiring a pooled connection in seconds
    pub acquire_timeout_secs: u64,
}

impl DbConfig {
    /// Settings with defaults for everything but the URL
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_retries: DEFAULT_CONNECT_RETRIES,
            base_retry_delay_ms: DEFAULT_BASE_RETRY_DELAY_MS,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

/// Top level bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token
    pub bot_token: String,
    /// Telegram id of the only user allowed into the admin panel.
    /// `0` disables the admin panel.
    pub owner_id: i64,
    /// Database settings
    pub db: DbConfig,
}

impl BotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = non_blank("BOT_TOKEN")
            .or_else(|| non_blank("TELEGRAM_BOT_TOKEN"))
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let database_url = non_blank("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut db = DbConfig::with_url(database_url);
        db.max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", db.max_connections)?;
        db.connect_retries = parse_or(&lookup, "DB_CONNECT_RETRIES", db.connect_retries)?;
        db.base_retry_delay_ms =
            parse_or(&lookup, "DB_RETRY_BASE_DELAY_MS", db.base_retry_delay_ms)?;
        db.max_retry_delay_ms = parse_or(&lookup, "DB_RETRY_MAX_DELAY_MS", db.max_retry_delay_ms)?;
        db.acquire_timeout_secs =
            parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", db.acquire_timeout_secs)?;

        if db.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            owner_id: parse_or(&lookup, "OWNER_ID", 0)?,
            db,
        })
    }

    /// Whether the given Telegram user is the configured owner
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.owner_id != 0 && user_id == self.owner_id
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
