use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::rate_limit::RateLimitPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: String,
    pub cors_origin: String,
    pub redis_url: Option<String>,
    pub rate_limit: RateLimitPolicy,
    pub rate_limit_capacity: usize,
    pub run_migrations: bool,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            database_url: var("DATABASE_URL")
                .context("Required environment variable 'DATABASE_URL' is not set")?,
            port: parse_or(var("PORT"), "PORT", 8000)?,
            environment: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
            cors_origin: var("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            redis_url: var("REDIS_URL"),
            rate_limit: RateLimitPolicy {
                max_requests: parse_or(var("RATE_LIMIT_MAX"), "RATE_LIMIT_MAX", 100)?,
                window: Duration::from_secs(parse_or(
                    var("RATE_LIMIT_WINDOW_SECS"),
                    "RATE_LIMIT_WINDOW_SECS",
                    60,
                )?),
            },
            rate_limit_capacity: parse_or(
                var("RATE_LIMIT_CAPACITY"),
                "RATE_LIMIT_CAPACITY",
                10_000,
            )?,
            run_migrations: parse_or(var("RUN_MIGRATIONS"), "RUN_MIGRATIONS", true)?,
            log_format: match var("RUST_LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value}")),
        None => Ok(default),
    }
}
