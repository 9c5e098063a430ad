//! # Database Module
//!
//! PostgreSQL storage for registered users and their coin balances.
//! Balance changes are always applied as relative updates inside the
//! database so concurrent handlers never overwrite each other.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::DbConfig;

/// Username stored for Telegram accounts without a public @username
pub const DEFAULT_USERNAME: &str = "NoName";

/// Represents a registered user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Name shown in the profile, falling back to the username
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(DEFAULT_USERNAME)
    }
}

/// Open the connection pool, retrying with exponential backoff and jitter
pub async fn connect_with_retry(config: &DbConfig) -> Result<PgPool> {
    let attempts = config.connect_retries.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) => {
                warn!(attempt, max_attempts = attempts, error = %e, "Database connection failed");
                last_error = Some(e);
                if attempt < attempts {
                    let delay = retry_delay(attempt, config);
                    debug!(delay_ms = delay.as_millis() as u64, "Waiting before next connection attempt");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    match last_error {
        Some(e) => Err(e).context(format!("Failed to connect to database after {attempts} attempts")),
        None => Err(anyhow::anyhow!("No database connection attempt was made")),
    }
}

/// Delay before the next attempt: doubles per attempt, capped, plus up to 10% jitter
pub fn retry_delay(attempt: u32, config: &DbConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let base = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_retry_delay_ms);
    let jitter = if base >= 10 {
        rand::thread_rng().gen_range(0..=base / 10)
    } else {
        0
    };
    Duration::from_millis(base + jitter)
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id BIGINT PRIMARY KEY,
            username TEXT,
            nickname TEXT,
            balance BIGINT NOT NULL DEFAULT 0,
            registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Register a user; existing users are left untouched.
///
/// Returns `true` when a new row was inserted.
pub async fn add_user(pool: &PgPool, user_id: i64, username: &str) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO users (user_id, username, nickname, balance)
         VALUES ($1, $2, $2, 0)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(username)
    .execute(pool)
    .await
    .context("Failed to register user")?;

    let created = result.rows_affected() > 0;
    if created {
        info!(user_id, "Registered new user");
    }
    Ok(created)
}

/// Read a user by Telegram id
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT user_id, username, nickname, balance, registered_at
         FROM users WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to read user")?;

    match row {
        Some(row) => Ok(Some(User {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            nickname: row.try_get("nickname")?,
            balance: row.try_get("balance")?,
            registered_at: row.try_get("registered_at")?,
        })),
        None => {
            debug!(user_id, "No user found");
            Ok(None)
        }
    }
}

/// Add `delta` (possibly negative) to a user's balance.
///
/// Returns `false` when the user does not exist.
pub async fn update_balance(pool: &PgPool, user_id: i64, delta: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET balance = balance + $1 WHERE user_id = $2")
        .bind(delta)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update balance")?;

    let updated = result.rows_affected() > 0;
    if updated {
        info!(user_id, delta, "Balance updated");
    } else {
        info!(user_id, "No user found for balance update");
    }
    Ok(updated)
}

/// Change a user's display nickname
pub async fn set_nickname(pool: &PgPool, user_id: i64, nickname: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET nickname = $1 WHERE user_id = $2")
        .bind(nickname)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update nickname")?;

    Ok(result.rows_affected() > 0)
}

/// Ids of every registered user
pub async fn get_all_user_ids(pool: &PgPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT user_id FROM users ORDER BY user_id")
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>("user_id"))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode user ids")
}

/// Credit `amount` to every registered user in a single statement.
///
/// Returns the number of users credited.
pub async fn credit_all_users(pool: &PgPool, amount: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET balance = balance + $1")
        .bind(amount)
        .execute(pool)
        .await
        .context("Failed to credit all users")?;

    let credited = result.rows_affected();
    info!(amount, users = credited, "Broadcast credit applied");
    Ok(credited)
}
