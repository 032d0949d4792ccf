use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `crawler.max-downloads`
pub const ENV_MAX_DOWNLOADS: &str = "MAX_DOWNLOADS";

/// Environment variable overriding `store.location`
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are read from the process environment.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Parses configuration text, applies overrides, and validates the result
///
/// # Arguments
///
/// * `content` - TOML document
/// * `env` - Lookup for environment overrides
pub fn parse_config<F>(content: &str, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    apply_overrides(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

/// Applies `MAX_DOWNLOADS` and `BUCKET_NAME` on top of a parsed config
///
/// Empty values are ignored. A `MAX_DOWNLOADS` that is not an integer is
/// rejected rather than silently dropped.
pub fn apply_overrides<F>(config: &mut Config, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = env(ENV_MAX_DOWNLOADS).filter(|v| !v.trim().is_empty()) {
        config.crawler.max_downloads =
            raw.trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::Environment {
                    name: ENV_MAX_DOWNLOADS.to_string(),
                    message: format!("'{}' is not an integer: {}", raw, e),
                })?;
        tracing::debug!(
            "{} overrides max-downloads: {}",
            ENV_MAX_DOWNLOADS,
            config.crawler.max_downloads
        );
    }

    if let Some(location) = env(ENV_BUCKET_NAME).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("{} overrides store location: {}", ENV_BUCKET_NAME, location);
        config.store.location = location;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be tied to the config that produced them.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
