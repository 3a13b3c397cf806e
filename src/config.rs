use anyhow::{Context, Result, anyhow};
use chrono::{Duration, FixedOffset};
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Punch policy
    pub punch_min_interval_secs: i64,
    /// Offset used to render punch times and local calendar days
    pub local_offset: FixedOffset,

    // Rate limiting
    pub rate_punch_per_min: u32,
    pub rate_read_per_min: u32,

    // Last punch cache
    pub last_punch_cache_ttl_secs: u64,
    pub last_punch_warmup_days: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` first.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            punch_min_interval_secs: parse_var("PUNCH_MIN_INTERVAL_SECS", "120")?, // 2 min
            local_offset: offset_from_minutes(parse_var("LOCAL_UTC_OFFSET_MINUTES", "0")?)?,

            rate_punch_per_min: parse_var("RATE_PUNCH_PER_MIN", "30")?,
            rate_read_per_min: parse_var("RATE_READ_PER_MIN", "1000")?,

            last_punch_cache_ttl_secs: parse_var("LAST_PUNCH_CACHE_TTL_SECS", "86400")?, // 24h
            last_punch_warmup_days: parse_var("LAST_PUNCH_WARMUP_DAYS", "2")?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_var("LOG_LEVEL", "debug")?,
        })
    }

    pub fn punch_min_interval(&self) -> Duration {
        Duration::seconds(self.punch_min_interval_secs)
    }
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("LOCAL_UTC_OFFSET_MINUTES out of range: {minutes}"))
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
