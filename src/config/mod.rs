pub mod env;
mod loader;

pub use env::{AppConfig, ConfigError, FetchConfig, LoggingConfig, SpamConfig};
pub use loader::load_config;
