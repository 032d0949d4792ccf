//! Storage module for archived documents
//!
//! This module provides the content store the pipeline reads and writes:
//! - The `ContentStore` trait (exists / put / get / list)
//! - A filesystem backend for local archives
//! - A SQLite backend for single-file archives
//! - An in-memory backend for tests and dry runs

mod fs;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ContentStore, StoreError, StoreResult};

use crate::config::{StoreBackend, StoreConfig};
use std::path::Path;
use std::sync::Arc;

/// Opens the content store described by the configuration
///
/// # Arguments
///
/// * `config` - The `[store]` section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn ContentStore>)` - Store ready to share between tasks
/// * `Err(StoreError)` - The backing directory or database could not be opened
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn ContentStore>> {
    let location = Path::new(&config.location);
    let store: Arc<dyn ContentStore> = match config.backend {
        StoreBackend::Filesystem => Arc::new(FsStore::new(location)?),
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(location)?),
    };

    tracing::debug!(
        "Opened {} store at {}",
        config.backend.as_str(),
        location.display()
    );

    Ok(store)
}
