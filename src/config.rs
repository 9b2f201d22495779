use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_punch_per_min: u32,

    /// How long a cached company setting is trusted before it is re-read.
    pub settings_ttl_secs: u64,
    /// Take the client address from `Forwarded` / `X-Forwarded-For`.
    pub trust_proxy_headers: bool,
    pub max_report_days: i64,
    pub run_migrations: bool,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_protected_per_min: optional("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_punch_per_min: optional("RATE_PUNCH_PER_MIN", 30)?,

            settings_ttl_secs: optional("SETTINGS_TTL_SECS", 60)?,
            trust_proxy_headers: optional("TRUST_PROXY_HEADERS", false)?,
            max_report_days: optional("MAX_REPORT_DAYS", 366)?,
            run_migrations: optional("RUN_MIGRATIONS", true)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: optional("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}
