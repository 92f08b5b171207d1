use crate::error::ConfigError;
use chrono::{DateTime, NaiveDate, Utc};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// First day of the set whose games are counted.
const DEFAULT_SINCE: &str = "2024-11-20";

#[derive(Debug, Clone)]
pub struct Config {
    pub riot_api_key: String,
    pub cache_file: PathBuf,
    pub cooldown: Duration,
    pub since: DateTime<Utc>,
    pub match_count: u32,
    pub fetch_concurrency: usize,
    pub max_rate_limit_retries: u32,
    pub base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let riot_api_key = lookup("RIOT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("RIOT_API_KEY"))?;

        let cache_file = cache_file(&lookup);

        let cooldown_minutes: u64 = parse_or(&lookup, "DUO_STATS_COOLDOWN_MINUTES", 2)?;

        let since_raw = lookup("DUO_STATS_SINCE").unwrap_or_else(|| DEFAULT_SINCE.to_string());
        let since = NaiveDate::parse_from_str(&since_raw, "%Y-%m-%d")
            .map_err(|e| ConfigError::Invalid {
                var: "DUO_STATS_SINCE",
                value: since_raw.clone(),
                reason: e.to_string(),
            })?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ConfigError::Invalid {
                var: "DUO_STATS_SINCE",
                value: since_raw.clone(),
                reason: "not a valid midnight".to_string(),
            })?;

        let fetch_concurrency: usize = parse_or(&lookup, "DUO_STATS_FETCH_CONCURRENCY", 4)?;
        if fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "DUO_STATS_FETCH_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            riot_api_key,
            cache_file,
            cooldown: Duration::from_secs(cooldown_minutes * 60),
            since,
            match_count: parse_or(&lookup, "DUO_STATS_MATCH_COUNT", 9999)?,
            fetch_concurrency,
            max_rate_limit_retries: parse_or(&lookup, "DUO_STATS_MAX_RETRIES", 12)?,
            base_url: lookup("RIOT_API_BASE_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

/// Reading the cache needs no API key.
pub fn cache_file_from_env() -> PathBuf {
    dotenv::dotenv().ok();
    cache_file(&|key: &str| env::var(key).ok())
}

fn cache_file<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("DUO_STATS_CACHE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("stats_cache.json"))
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
