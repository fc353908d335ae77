use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://analytics.usa.gov/data";

#[derive(Debug, Error)]
#[error("invalid {key} value '{value}': {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cities_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            parse_base_url(&env::var("ANALYTICS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))?;

        Ok(Self {
            port: try_load("PORT", 8080)?,
            base_url,
            request_timeout: parse_timeout(try_load("ANALYTICS_TIMEOUT_SECS", 10)?)?,
            cities_path: env::var("CITIES_PATH").ok().map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            cities_path: None,
        }
    }
}

/// Feed root without a trailing slash. Must be an absolute http(s) URL.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let base_url = raw.trim().trim_end_matches('/');
    let invalid = |reason: &str| ConfigError {
        key: "ANALYTICS_BASE_URL",
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    if base_url.is_empty() {
        return Err(invalid("must not be empty"));
    }
    match base_url.split_once("://") {
        Some(("http" | "https", host)) if !host.is_empty() => Ok(base_url.to_string()),
        _ => Err(invalid("expected an http:// or https:// URL")),
    }
}

fn parse_timeout(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError {
            key: "ANALYTICS_TIMEOUT_SECS",
            value: secs.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|err: T::Err| ConfigError {
            key,
            value,
            reason: err.to_string(),
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
