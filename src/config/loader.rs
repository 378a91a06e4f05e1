use std::{env, path::PathBuf, str::FromStr, time::Duration};

use super::env::{AppConfig, ConfigError, FetchConfig, LoggingConfig, SpamConfig};

const DEFAULT_REDIRECT_DEPTH: u32 = 2;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so it can be
    /// fed something other than the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let spam = SpamConfig {
            spam_link_domains: var("SPAM_LINK_DOMAINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            redirect_depth: parse_or(&var, "REDIRECT_DEPTH", DEFAULT_REDIRECT_DEPTH)?,
        };

        let defaults = FetchConfig::default();
        let fetch = FetchConfig {
            timeout: parse_millis(&var, "FETCH_TIMEOUT", defaults.timeout)?,
            connect_timeout: parse_millis(&var, "FETCH_CONNECT_TIMEOUT", defaults.connect_timeout)?,
            user_agent: var("FETCH_USER_AGENT").unwrap_or(defaults.user_agent),
            max_body_length: parse_or(&var, "FETCH_MAX_BODY_LENGTH", defaults.max_body_length)?,
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            logs_dir: var("LOGS_DIR").map(PathBuf::from),
        };

        Ok(Self {
            spam,
            fetch,
            logging,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_millis<F>(var: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(var, key, default_ms).map(Duration::from_millis)
}
