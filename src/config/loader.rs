//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::ValidationError;

/// Environment variable overriding `rate_limit.requests_limit`.
pub const ENV_RATE_LIMIT: &str = "RATE_LIMIT";
/// Environment variable overriding `rate_limit.window_secs`.
pub const ENV_RATE_LIMIT_WINDOW: &str = "RATE_LIMIT_WINDOW";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and deserialize a TOML configuration file.
///
/// Semantic validation is a separate step so that environment overrides are
/// checked too; see [`crate::config::validation::validate_config`].
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Deserialize configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply `RATE_LIMIT` / `RATE_LIMIT_WINDOW` from the process environment.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), ConfigError> {
    apply_overrides_with(config, |var| std::env::var(var).ok())
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_with<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_RATE_LIMIT) {
        config.rate_limit.requests_limit = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: ENV_RATE_LIMIT, value })?;
    }

    if let Some(value) = lookup(ENV_RATE_LIMIT_WINDOW) {
        config.rate_limit.window_secs = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: ENV_RATE_LIMIT_WINDOW, value })?;
    }

    Ok(())
}
