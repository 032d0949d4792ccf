//! kb-archiver: knowledge-base fetch-and-archive pipeline
//!
//! This crate lists the articles of a knowledge base, archives their raw HTML
//! into a content store with bounded batched concurrency (the bronze stage),
//! and extracts article plain text from the archive (the silver stage).

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for kb-archiver operations
#[derive(Debug, Error)]
pub enum KbError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid environment override {name}: {message}")]
    Environment { name: String, message: String },
}

/// Result type alias for kb-archiver operations
pub type Result<T> = std::result::Result<T, KbError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use artifact::{artifact_key, ArtifactKey};
pub use catalog::{CatalogEntry, LinkRecord};
pub use config::Config;
pub use crawler::{ArchiveOutcome, CrawlReport, Crawler, CrawlerSettings};
pub use state::TaskState;
pub use storage::{ContentStore, FsStore, MemoryStore, SqliteStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: KbError =
            ConfigError::Validation("batch-size must be at least 1".to_string()).into();
        assert!(matches!(err, KbError::Config(ConfigError::Validation(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation error: batch-size must be at least 1"
        );
    }

    #[test]
    fn test_output_error_converts() {
        let err: KbError = output::OutputError::Write {
            path: "report.md".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(matches!(err, KbError::Output(_)));
        assert!(err
            .to_string()
            .starts_with("Output error: Failed to write output to report.md"));
    }
}
