//! Configuration module for kb-archiver
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the environment overrides the pipeline honours.
//!
//! # Example
//!
//! ```no_run
//! use kb_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Batch size: {}", config.crawler.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, CrawlerConfig, OutputConfig, StoreBackend, StoreConfig,
    UserAgentConfig, DEFAULT_INDEX_URL, DEFAULT_STORE_LOCATION, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash, parse_config,
    ENV_BUCKET_NAME, ENV_MAX_DOWNLOADS,
};
pub use validation::validate;
