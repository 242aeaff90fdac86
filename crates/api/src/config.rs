//! Process configuration from environment variables.

use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::Duration;

use votecast_observability::LogFormat;
use votecast_products::DEFAULT_VOTE_WINDOW_HOURS;

pub const DEFAULT_PORT: u16 = 8000;

/// Where product documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub vote_window: Duration,
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            vote_window: Duration::hours(DEFAULT_VOTE_WINDOW_HOURS),
            store: StoreConfig::InMemory,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Only the log format, so logging can be installed before the rest is read.
    pub fn log_format_from_env() -> anyhow::Result<LogFormat> {
        parse_or(&|key| std::env::var(key).ok(), "LOG_FORMAT", LogFormat::default())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let window_hours: i64 = parse_or(&lookup, "VOTE_WINDOW_HOURS", DEFAULT_VOTE_WINDOW_HOURS)?;
        if window_hours <= 0 {
            bail!("VOTE_WINDOW_HOURS must be positive (got {window_hours})");
        }

        let use_persistent: bool = parse_or(&lookup, "USE_PERSISTENT_STORES", false)?;
        let store = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;
            StoreConfig::Postgres { database_url }
        } else {
            StoreConfig::InMemory
        };

        Ok(Self {
            port,
            vote_window: Duration::hours(window_hours),
            store,
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::default())?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + core::fmt::Debug,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => {
            tracing::info!(key, default = ?default, "config value not set; using default");
            Ok(default)
        }
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
    }
}
