use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spam: SpamConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct SpamConfig {
    pub spam_link_domains: Vec<String>,
    pub redirect_depth: u32,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_body_length: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            connect_timeout: Duration::from_millis(5_000),
            user_agent: format!("spam-link-guard/{}", env!("CARGO_PKG_VERSION")),
            max_body_length: 1_048_576,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub logs_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
