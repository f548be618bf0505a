//! Process configuration from environment variables (`.env` supported)

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::jobs::rice_price_sync::DEFAULT_SCRAPE_INTERVAL_SECS;
use crate::scrapers::{DEFAULT_SCRAPE_URL, DEFAULT_USER_AGENT, ScraperConfig};
use crate::services::ingestion::DEFAULT_RUN_TIMEOUT_SECS;
use crate::services::normalizer::DEFAULT_ITEM_NAME;

/// Environment variable for the database connection string
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable for the HTTP listen address
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const ENV_SCRAPE_URL: &str = "RICE_SCRAPE_URL";
pub const ENV_ITEM_NAME: &str = "RICE_ITEM_NAME";
pub const ENV_SCRAPE_INTERVAL: &str = "RICE_SCRAPE_INTERVAL_SECS";
pub const ENV_SETTLE: &str = "RICE_SCRAPE_SETTLE_SECS";
pub const ENV_RUN_TIMEOUT: &str = "RICE_RUN_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "RICE_USER_AGENT";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

/// Set to "false" to serve the API without the background scraper
pub const ENV_SCRAPE_ENABLED: &str = "RICE_SCRAPE_ENABLED";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SETTLE_SECS: u64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub item_name: String,
    pub scrape_interval: Duration,
    pub run_timeout: Duration,
    pub scrape_enabled: bool,
    pub scraper: ScraperConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var(ENV_DATABASE_URL).map_err(|_| ConfigError::Missing(ENV_DATABASE_URL))?;

        Ok(Self {
            database_url,
            bind_addr: env_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR),
            item_name: item_name_from_env(),
            scrape_interval: Duration::from_secs(parse_env(
                ENV_SCRAPE_INTERVAL,
                DEFAULT_SCRAPE_INTERVAL_SECS,
            )),
            run_timeout: Duration::from_secs(parse_env(ENV_RUN_TIMEOUT, DEFAULT_RUN_TIMEOUT_SECS)),
            scrape_enabled: env::var(ENV_SCRAPE_ENABLED)
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            scraper: scraper_config_from_env(),
        })
    }
}

/// Browser/scrape settings only; usable without a database
pub fn scraper_config_from_env() -> ScraperConfig {
    ScraperConfig {
        url: env_or(ENV_SCRAPE_URL, DEFAULT_SCRAPE_URL),
        user_agent: env_or(ENV_USER_AGENT, DEFAULT_USER_AGENT),
        settle: Duration::from_secs(parse_env(ENV_SETTLE, DEFAULT_SETTLE_SECS)),
        chrome_executable: env::var(ENV_CHROME_EXECUTABLE).ok(),
        ..ScraperConfig::default()
    }
}

pub fn item_name_from_env() -> String {
    env_or(ENV_ITEM_NAME, DEFAULT_ITEM_NAME)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a numeric variable, falling back to `default` when unset or invalid
fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("{}='{}' is not a valid number, using {}", key, raw, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or("X", "42", 7u64), 42);
        assert_eq!(parse_or("X", " 42 ", 7u64), 42);
        assert_eq!(parse_or("X", "abc", 7u64), 7);
        assert_eq!(parse_or("X", "-5", 7u64), 7);
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(ENV_DATABASE_URL, "DATABASE_URL");
        assert_eq!(ENV_SCRAPE_INTERVAL, "RICE_SCRAPE_INTERVAL_SECS");
        assert_eq!(ENV_RUN_TIMEOUT, "RICE_RUN_TIMEOUT_SECS");
    }
}
